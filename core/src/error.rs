//! Error types shared across the engine.
//!
//! Two classes of failure exist. Configuration faults ([`DefinitionError`])
//! come from a command author declaring something impossible, such as a group
//! naming an undefined flag. The panicking `mark_*` APIs turn them into
//! immediate aborts; the `try_*` forms hand them back for definition loaders.
//! Everything else is user input going wrong and is returned as an ordinary
//! error for the host to print.

use thiserror::Error;

use crate::args::ArgsError;
use crate::flags::RequiredFlagsError;
use crate::groups::{FlagGroupErrors, FlagGroupKind};

/// A command definition that cannot be honoured.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// A flag group names a flag the command does not define locally.
    #[error("failed to find flag {flag:?} and mark it as being {kind} in a flag group")]
    UnknownGroupFlag {
        /// The missing flag name.
        flag: String,
        /// Which kind of group was being declared.
        kind: FlagGroupKind,
    },
    /// A flag group was declared with no flags at all.
    #[error("a {0} flag group must name at least one flag")]
    EmptyGroup(FlagGroupKind),
    /// A required flag was marked on a command that does not define it.
    #[error("failed to find flag {0:?} and mark it as required")]
    UnknownRequiredFlag(String),
    /// Two flags with the same name were added to one flag set.
    #[error("flag redefined: {0}")]
    DuplicateFlag(String),
    /// Two flags in one flag set share a shorthand letter.
    #[error("unable to redefine {shorthand:?} shorthand in flag set: it's already used for {existing:?} flag")]
    DuplicateShorthand {
        /// The contested shorthand.
        shorthand: char,
        /// The flag that already owns it.
        existing: String,
    },
}

/// Failure to set a flag on a command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlagError {
    /// No flag with this name exists in the command's effective flag set.
    #[error("unknown flag: --{0}")]
    Unknown(String),
}

/// Any user-facing failure raised while validating an invocation.
///
/// Returned by [`Command::validate`](crate::Command::validate), which runs the
/// checks in a fixed order and stops at the first stage that fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The positional argument rule rejected the arguments.
    #[error(transparent)]
    Args(#[from] ArgsError),
    /// One or more required flags were not set.
    #[error(transparent)]
    RequiredFlags(#[from] RequiredFlagsError),
    /// One or more flag group constraints were violated.
    #[error(transparent)]
    FlagGroups(#[from] FlagGroupErrors),
}
