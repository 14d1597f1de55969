//! Positional argument rules and flag group constraints for CLI commands.
//!
//! This crate is the validation core of a command-line framework. It does not
//! tokenize process arguments; the host resolves the invoked [`Command`],
//! records which flags were set, and hands over the remaining positional
//! arguments.
//!
//! - [`PositionalArgs`]: composable rules over positional arguments (exact,
//!   minimum, maximum and range counts, valid values, sub-command names).
//! - [`Command::mark_flags_required_together`],
//!   [`Command::mark_flags_one_required`],
//!   [`Command::mark_flags_mutually_exclusive`]: relational constraints
//!   between flags, checked by [`Command::validate_flag_groups`].
//! - [`Command::enforce_flag_groups_for_completion`]: the same constraints
//!   turned into [`CompletionHints`] that guide shell completion.
//! - [`CommandDefinition`]: a command tree described as YAML or JSON.
//!
//! Declaring a group over a flag the command does not define is a programming
//! error and panics. Everything a user can get wrong comes back as an
//! ordinary error; the crate never logs and never exits the process.
//!
//! # Example
//!
//! ```
//! use command_guard_core::*;
//!
//! let mut cmd = Command::new("backup")
//!     .with_args(PositionalArgs::RangeArgs { min: 1, max: 2 })
//!     .with_flag(Flag::new("local"))
//!     .with_flag(Flag::new("remote"))
//!     .with_flag(Flag::new("bucket"));
//! cmd.mark_flags_one_required(&["local", "remote"]);
//! cmd.mark_flags_required_together(&["remote", "bucket"]);
//!
//! cmd.set_flag("remote", "s3").unwrap();
//! let err = cmd.validate(&["/home"]).unwrap_err();
//! assert_eq!(
//!     err.to_string(),
//!     "if any flags in the group [remote bucket] are set they must all be set; missing [bucket]"
//! );
//!
//! let hints = cmd.enforce_flag_groups_for_completion();
//! assert!(hints.is_required("bucket"));
//!
//! cmd.set_flag("bucket", "archive").unwrap();
//! assert!(cmd.validate(&["/home"]).is_ok());
//! ```

mod args;
mod command;
mod completion;
mod definition;
mod error;
mod flags;
mod groups;
mod suggest;

pub use args::{ArgsError, PositionalArgs};
pub use command::Command;
pub use completion::{CompletionHints, FlagHint};
pub use definition::{CommandDefinition, FlagDefinition, GroupDefinitions};
pub use error::{DefinitionError, Error, FlagError};
pub use flags::{Flag, FlagSet, RequiredFlagsError};
pub use groups::{FlagGroup, FlagGroupError, FlagGroupErrors, FlagGroupKind, GroupId, GroupMembership};
pub use suggest::{DEFAULT_SUGGESTIONS_MINIMUM_DISTANCE, levenshtein, suggestions_for};
