//! Positional argument rules.
//!
//! A [`PositionalArgs`] rule looks at a command and the positional arguments
//! left over once flags have been parsed, and either accepts them or explains
//! what is wrong. Rules compose with [`PositionalArgs::MatchAll`].
//!
//! Rules are plain data so they can be written into command definitions:
//!
//! ```
//! use command_guard_core::PositionalArgs;
//!
//! let rule: PositionalArgs = serde_json::from_str(r#"{"match_all": [{"range_args": {"min": 1, "max": 2}}, "only_valid_args"]}"#).unwrap();
//! assert_eq!(
//!     rule,
//!     PositionalArgs::MatchAll(vec![
//!         PositionalArgs::RangeArgs { min: 1, max: 2 },
//!         PositionalArgs::OnlyValidArgs,
//!     ])
//! );
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::command::Command;
use crate::suggest::format_suggestions;

/// A rule over a command's positional arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PositionalArgs {
    /// Root commands with sub-commands only accept sub-command names; anything
    /// else accepts arbitrary arguments. Used when a command sets no rule.
    #[default]
    LegacyArgs,
    /// No positional arguments at all.
    NoArgs,
    /// Any positional arguments.
    ArbitraryArgs,
    /// At least `n` arguments.
    MinimumNArgs(usize),
    /// At most `n` arguments.
    MaximumNArgs(usize),
    /// Exactly `n` arguments.
    ExactArgs(usize),
    /// Between `min` and `max` arguments, inclusive.
    RangeArgs {
        /// Lower bound.
        min: usize,
        /// Upper bound.
        max: usize,
    },
    /// Every argument must be one of the command's valid arguments.
    OnlyValidArgs,
    /// Exactly `n` arguments, each one of the command's valid arguments.
    ExactValidArgs(usize),
    /// Every rule, in order; the first failure wins.
    MatchAll(Vec<PositionalArgs>),
}

impl PositionalArgs {
    /// Checks `args` against the rule for `cmd`.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_guard_core::{Command, PositionalArgs};
    ///
    /// let cmd = Command::new("get").with_valid_args(["pods", "nodes"]);
    /// let rule = PositionalArgs::ExactValidArgs(1);
    ///
    /// assert!(rule.validate(&cmd, &["pods"]).is_ok());
    /// assert_eq!(
    ///     rule.validate(&cmd, &["pods", "nodes"]).unwrap_err().to_string(),
    ///     "\"get\" accepts 1 arg(s), received 2"
    /// );
    /// assert_eq!(
    ///     rule.validate(&cmd, &["secrets"]).unwrap_err().to_string(),
    ///     "invalid argument \"secrets\" for \"get\"; valid arguments: nodes, pods"
    /// );
    /// ```
    pub fn validate<S: AsRef<str>>(&self, cmd: &Command, args: &[S]) -> Result<(), ArgsError> {
        let received = args.len();
        match self {
            PositionalArgs::LegacyArgs => legacy_args(cmd, args),
            PositionalArgs::NoArgs => match args.first() {
                Some(arg) => Err(ArgsError::UnknownCommand {
                    arg: arg.as_ref().to_string(),
                    command: cmd.command_path(),
                    suggestions: Vec::new(),
                }),
                None => Ok(()),
            },
            PositionalArgs::ArbitraryArgs => Ok(()),
            PositionalArgs::MinimumNArgs(min) => {
                if received < *min {
                    return Err(ArgsError::TooFew {
                        command: cmd.command_path(),
                        min: *min,
                        received,
                    });
                }
                Ok(())
            }
            PositionalArgs::MaximumNArgs(max) => {
                if received > *max {
                    return Err(ArgsError::TooMany {
                        command: cmd.command_path(),
                        max: *max,
                        received,
                    });
                }
                Ok(())
            }
            PositionalArgs::ExactArgs(expected) => {
                if received != *expected {
                    return Err(ArgsError::WrongCount {
                        command: cmd.command_path(),
                        expected: *expected,
                        received,
                    });
                }
                Ok(())
            }
            PositionalArgs::RangeArgs { min, max } => {
                if received < *min || received > *max {
                    return Err(ArgsError::OutOfRange {
                        command: cmd.command_path(),
                        min: *min,
                        max: *max,
                        received,
                    });
                }
                Ok(())
            }
            PositionalArgs::OnlyValidArgs => only_valid_args(cmd, args),
            PositionalArgs::ExactValidArgs(expected) => {
                PositionalArgs::ExactArgs(*expected).validate(cmd, args)?;
                only_valid_args(cmd, args)
            }
            PositionalArgs::MatchAll(rules) => {
                for rule in rules {
                    rule.validate(cmd, args)?;
                }
                Ok(())
            }
        }
    }
}

fn only_valid_args<S: AsRef<str>>(cmd: &Command, args: &[S]) -> Result<(), ArgsError> {
    let valid: Vec<&str> = cmd.valid_arg_names().collect();
    if valid.is_empty() {
        return Ok(());
    }

    for arg in args {
        let arg = arg.as_ref();
        if !valid.contains(&arg) {
            let mut valid: Vec<String> = valid.iter().map(|v| v.to_string()).collect();
            valid.sort();
            valid.dedup();
            return Err(ArgsError::InvalidArgument {
                arg: arg.to_string(),
                command: cmd.command_path(),
                valid,
            });
        }
    }
    Ok(())
}

fn legacy_args<S: AsRef<str>>(cmd: &Command, args: &[S]) -> Result<(), ArgsError> {
    if !cmd.has_subcommands() || cmd.has_parent() {
        return Ok(());
    }

    match args.first() {
        Some(arg) => {
            let arg = arg.as_ref();
            if cmd.subcommand_names().any(|name| name == arg) {
                return Ok(());
            }
            Err(ArgsError::UnknownCommand {
                arg: arg.to_string(),
                command: cmd.command_path(),
                suggestions: cmd.suggestions_for(arg),
            })
        }
        None => Ok(()),
    }
}

/// Why a command's positional arguments were rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgsError {
    /// An argument was given where a sub-command name (or nothing) was expected.
    #[error("unknown command {arg:?} for {command:?}{}", format_suggestions(.suggestions))]
    UnknownCommand {
        /// The offending argument.
        arg: String,
        /// Path of the command that rejected it.
        command: String,
        /// Sub-commands the user may have meant.
        suggestions: Vec<String>,
    },
    /// Fewer arguments than the minimum.
    #[error("{command:?} requires at least {min} arg(s), only received {received}")]
    TooFew {
        /// Path of the command.
        command: String,
        /// Minimum accepted.
        min: usize,
        /// Number given.
        received: usize,
    },
    /// More arguments than the maximum.
    #[error("{command:?} accepts at most {max} arg(s), received {received}")]
    TooMany {
        /// Path of the command.
        command: String,
        /// Maximum accepted.
        max: usize,
        /// Number given.
        received: usize,
    },
    /// Not exactly the expected number of arguments.
    #[error("{command:?} accepts {expected} arg(s), received {received}")]
    WrongCount {
        /// Path of the command.
        command: String,
        /// Number expected.
        expected: usize,
        /// Number given.
        received: usize,
    },
    /// Outside an inclusive range.
    #[error("{command:?} accepts between {min} and {max} arg(s), received {received}")]
    OutOfRange {
        /// Path of the command.
        command: String,
        /// Lower bound.
        min: usize,
        /// Upper bound.
        max: usize,
        /// Number given.
        received: usize,
    },
    /// An argument outside the command's valid arguments.
    #[error("invalid argument {arg:?} for {command:?}; valid arguments: {}", .valid.join(", "))]
    InvalidArgument {
        /// The offending argument.
        arg: String,
        /// Path of the command.
        command: String,
        /// The valid arguments, sorted.
        valid: Vec<String>,
    },
}
