//! Declarative command definitions.
//!
//! A [`CommandDefinition`] describes a command tree as data (YAML or JSON)
//! and builds the equivalent [`Command`]. Building goes through the fallible
//! declaration APIs, so a definition that names an undefined flag in a group
//! is reported as a [`DefinitionError`] instead of aborting.
//!
//! # Example YAML
//!
//! ```yaml
//! name: deploy
//! args:
//!   maximum_n_args: 1
//! flags:
//!   - name: env
//!     shorthand: e
//!     required: true
//!   - name: json
//!   - name: yaml
//! groups:
//!   mutually_exclusive:
//!     - [json, yaml]
//! subcommands:
//!   - name: rollback
//!     aliases: [rb]
//! ```

use serde::{Deserialize, Serialize};

use crate::args::PositionalArgs;
use crate::command::Command;
use crate::error::DefinitionError;
use crate::flags::Flag;
use crate::groups::FlagGroupKind;

/// A flag as written in a definition file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagDefinition {
    /// Long name, without dashes.
    pub name: String,
    /// One-letter short form.
    pub shorthand: Option<char>,
    /// Help text.
    pub usage: String,
    /// Value used when the flag is not given.
    pub default: Option<String>,
    /// Never suggested during completion.
    pub hidden: bool,
    /// Inherited by sub-commands.
    pub persistent: bool,
    /// Must be given.
    pub required: bool,
}

impl FlagDefinition {
    fn to_flag(&self) -> Flag {
        Flag {
            name: self.name.clone(),
            shorthand: self.shorthand,
            usage: self.usage.clone(),
            default_value: self.default.clone(),
            hidden: self.hidden,
            persistent: self.persistent,
            ..Default::default()
        }
    }
}

/// Flag groups as written in a definition file: one list of names per group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupDefinitions {
    /// All or none of each group must be set.
    pub required_together: Vec<Vec<String>>,
    /// At least one of each group must be set.
    pub one_required: Vec<Vec<String>>,
    /// At most one of each group may be set.
    pub mutually_exclusive: Vec<Vec<String>>,
}

impl GroupDefinitions {
    fn by_kind(&self) -> [(FlagGroupKind, &[Vec<String>]); 3] {
        [
            (FlagGroupKind::RequiredTogether, self.required_together.as_slice()),
            (FlagGroupKind::OneRequired, self.one_required.as_slice()),
            (FlagGroupKind::MutuallyExclusive, self.mutually_exclusive.as_slice()),
        ]
    }
}

/// A command tree as written in a definition file.
///
/// # Examples
///
/// ```
/// use command_guard_core::{CommandDefinition, DefinitionError, FlagGroupKind};
///
/// let definition: CommandDefinition = serde_json::from_str(r#"{
///     "name": "export",
///     "flags": [{"name": "json"}, {"name": "yaml"}],
///     "groups": {"one_required": [["json", "yaml"]]}
/// }"#).unwrap();
/// let cmd = definition.build().unwrap();
/// assert_eq!(cmd.flag_groups().len(), 1);
///
/// let broken: CommandDefinition = serde_json::from_str(r#"{
///     "name": "export",
///     "groups": {"mutually_exclusive": [["json"]]}
/// }"#).unwrap();
/// assert_eq!(
///     broken.build().unwrap_err(),
///     DefinitionError::UnknownGroupFlag {
///         flag: "json".into(),
///         kind: FlagGroupKind::MutuallyExclusive,
///     }
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandDefinition {
    /// Command name.
    pub name: String,
    /// Alternative names.
    pub aliases: Vec<String>,
    /// Left out of suggestions.
    pub hidden: bool,
    /// Values accepted by `only_valid_args`; `"value\tdescription"` allowed.
    pub valid_args: Vec<String>,
    /// Positional argument rule; `legacy_args` when absent. Written as a
    /// single-key map (`exact_args: 2`) in YAML as well as JSON.
    #[serde(with = "serde_yaml::with::singleton_map_recursive")]
    pub args: Option<PositionalArgs>,
    /// Turns off "did you mean" suggestions.
    pub disable_suggestions: bool,
    /// Edit distance for suggestions; the default applies when absent.
    pub suggestions_minimum_distance: Option<usize>,
    /// Local flags.
    pub flags: Vec<FlagDefinition>,
    /// Flag groups over local flags.
    pub groups: GroupDefinitions,
    /// Nested commands.
    pub subcommands: Vec<CommandDefinition>,
}

impl CommandDefinition {
    /// Builds the command tree.
    ///
    /// # Errors
    ///
    /// Returns the first [`DefinitionError`] met: a duplicate flag, a required
    /// flag or group member that is not a local flag, or an empty group.
    pub fn build(&self) -> Result<Command, DefinitionError> {
        let mut cmd = Command::new(self.name.as_str()).with_valid_args(self.valid_args.iter().cloned());
        for alias in &self.aliases {
            cmd = cmd.with_alias(alias);
        }
        if self.hidden {
            cmd = cmd.hidden();
        }
        if let Some(args) = &self.args {
            cmd = cmd.with_args(args.clone());
        }
        if self.disable_suggestions {
            cmd = cmd.without_suggestions();
        }
        if let Some(distance) = self.suggestions_minimum_distance {
            cmd = cmd.with_suggestions_minimum_distance(distance);
        }

        for flag in &self.flags {
            cmd.flags_mut().try_add(flag.to_flag())?;
        }
        for flag in self.flags.iter().filter(|flag| flag.required) {
            cmd.try_mark_flag_required(&flag.name)?;
        }
        for (kind, groups) in self.groups.by_kind() {
            for names in groups {
                cmd.try_mark_flag_group(kind, names.as_slice())?;
            }
        }

        for sub in &self.subcommands {
            cmd.add_subcommand(sub.build()?);
        }
        Ok(cmd)
    }
}
