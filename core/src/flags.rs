//! Flag records and the flag registry.
//!
//! A [`FlagSet`] keeps flags in registration order. That order is observable:
//! it decides how required-flag errors and completion candidates are listed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::DefinitionError;
use crate::groups::GroupMembership;

/// A single named flag and its current state.
///
/// # Examples
///
/// ```
/// use command_guard_core::Flag;
///
/// let flag = Flag::new("output")
///     .with_shorthand('o')
///     .with_usage("write results here")
///     .persistent();
/// assert_eq!(flag.name, "output");
/// assert!(flag.persistent);
/// assert!(!flag.changed);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Flag {
    /// Long name, without leading dashes.
    pub name: String,
    /// One-letter short form, without the leading dash.
    pub shorthand: Option<char>,
    /// Help text.
    pub usage: String,
    /// Value used when the flag is not given.
    pub default_value: Option<String>,
    /// Value given on the command line, if any.
    pub value: Option<String>,
    /// Whether the flag was explicitly set.
    pub changed: bool,
    /// Hidden flags are accepted but never suggested.
    pub hidden: bool,
    /// Persistent flags are inherited by sub-commands.
    pub persistent: bool,
    /// Must be set for the command to run.
    pub required: bool,
    /// Flag groups this flag belongs to.
    pub groups: GroupMembership,
}

impl Flag {
    /// Creates an unset flag with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Sets the one-letter short form.
    pub fn with_shorthand(mut self, shorthand: char) -> Self {
        self.shorthand = Some(shorthand);
        self
    }

    /// Sets the help text.
    pub fn with_usage(mut self, usage: &str) -> Self {
        self.usage = usage.to_string();
        self
    }

    /// Sets the default value.
    pub fn with_default(mut self, value: &str) -> Self {
        self.default_value = Some(value.to_string());
        self
    }

    /// Hides the flag from completion.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Makes the flag visible to sub-commands.
    pub fn persistent(mut self) -> Self {
        self.persistent = true;
        self
    }

    /// Returns the explicit value, falling back to the default.
    pub fn effective_value(&self) -> Option<&str> {
        self.value.as_deref().or(self.default_value.as_deref())
    }

    /// Marks the flag as explicitly set to `value`.
    pub fn set(&mut self, value: impl Into<String>) {
        self.value = Some(value.into());
        self.changed = true;
    }
}

/// An ordered collection of uniquely named flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagSet {
    flags: Vec<Flag>,
}

impl FlagSet {
    /// Creates an empty flag set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a flag.
    ///
    /// # Panics
    ///
    /// Panics if the name or shorthand is already taken; see
    /// [`try_add`](Self::try_add) for the fallible form.
    pub fn add(&mut self, flag: Flag) {
        if let Err(err) = self.try_add(flag) {
            panic!("{err}");
        }
    }

    /// Adds a flag, rejecting a duplicate name or shorthand.
    pub fn try_add(&mut self, flag: Flag) -> Result<(), DefinitionError> {
        if self.lookup(&flag.name).is_some() {
            return Err(DefinitionError::DuplicateFlag(flag.name));
        }
        if let Some(shorthand) = flag.shorthand {
            if let Some(existing) = self.lookup_shorthand(shorthand) {
                return Err(DefinitionError::DuplicateShorthand {
                    shorthand,
                    existing: existing.name.clone(),
                });
            }
        }
        self.flags.push(flag);
        Ok(())
    }

    /// Finds a flag by name.
    pub fn lookup(&self, name: &str) -> Option<&Flag> {
        self.flags.iter().find(|flag| flag.name == name)
    }

    /// Finds a flag by name for modification.
    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut Flag> {
        self.flags.iter_mut().find(|flag| flag.name == name)
    }

    /// Finds a flag by its one-letter short form.
    pub fn lookup_shorthand(&self, shorthand: char) -> Option<&Flag> {
        self.flags
            .iter()
            .find(|flag| flag.shorthand == Some(shorthand))
    }

    /// Sets a flag by name.
    ///
    /// Returns `false` when no such flag exists.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.lookup_mut(name) {
            Some(flag) => {
                flag.set(value);
                true
            }
            None => false,
        }
    }

    /// Whether the named flag exists and was explicitly set.
    pub fn changed(&self, name: &str) -> bool {
        self.lookup(name).is_some_and(|flag| flag.changed)
    }

    /// Iterates flags in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Flag> {
        self.flags.iter()
    }

    /// Number of flags.
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Whether the set holds no flags.
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

/// Required flags that were not set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("required flag(s) {} not set", quoted_list(.missing))]
pub struct RequiredFlagsError {
    /// Unset required flags, in registration order.
    pub missing: Vec<String>,
}

fn quoted_list(names: &[String]) -> String {
    names
        .iter()
        .map(|name| format!("{name:?}"))
        .collect::<Vec<_>>()
        .join(", ")
}
