//! Completion-time guidance derived from flag groups.
//!
//! During shell completion the groups do not reject anything. Instead they
//! steer what gets suggested: flags a group still needs are surfaced as
//! required, and flags a mutually-exclusive group has ruled out are hidden.
//! The result is a fresh [`CompletionHints`] value per request; flag
//! definitions and group declarations are left untouched.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::command::Command;
use crate::groups::FlagGroupKind;

/// How one flag should be treated when offering completions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FlagHint {
    /// Do not suggest the flag.
    pub hidden: bool,
    /// The flag still has to be provided.
    pub required: bool,
}

/// Per-flag completion hints for one completion request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CompletionHints {
    flags: BTreeMap<String, FlagHint>,
}

impl CompletionHints {
    /// The hint for `name`; unknown flags get the default (visible, optional).
    pub fn get(&self, name: &str) -> FlagHint {
        self.flags.get(name).copied().unwrap_or_default()
    }

    /// Whether `name` should be left out of suggestions.
    pub fn is_hidden(&self, name: &str) -> bool {
        self.get(name).hidden
    }

    /// Whether `name` still has to be provided.
    pub fn is_required(&self, name: &str) -> bool {
        self.get(name).required
    }

    /// Names of flags still required, sorted.
    pub fn required(&self) -> impl Iterator<Item = &str> {
        self.flags
            .iter()
            .filter(|(_, hint)| hint.required)
            .map(|(name, _)| name.as_str())
    }

    /// Names of hidden flags, sorted.
    pub fn hidden(&self) -> impl Iterator<Item = &str> {
        self.flags
            .iter()
            .filter(|(_, hint)| hint.hidden)
            .map(|(name, _)| name.as_str())
    }

    /// Every flag with its hint, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, FlagHint)> {
        self.flags.iter().map(|(name, hint)| (name.as_str(), *hint))
    }

    fn hint_mut(&mut self, name: &str) -> &mut FlagHint {
        self.flags.entry(name.to_string()).or_default()
    }

    /// Flag names to offer for the word being completed.
    ///
    /// When the word starts with `-`, every visible flag not yet set whose
    /// `--name` starts with the word is offered; a bare `-` also offers
    /// one-letter forms. Otherwise only flags still required are offered, so
    /// the user is pointed at what is missing.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_guard_core::{Command, Flag};
    ///
    /// let mut cmd = Command::new("export")
    ///     .with_flag(Flag::new("json").with_shorthand('j'))
    ///     .with_flag(Flag::new("yaml"))
    ///     .with_flag(Flag::new("out"));
    /// cmd.mark_flags_mutually_exclusive(&["json", "yaml"]);
    /// cmd.mark_flags_one_required(&["out"]);
    ///
    /// let hints = cmd.enforce_flag_groups_for_completion();
    /// assert_eq!(hints.flag_completions(&cmd, ""), vec!["--out"]);
    /// assert_eq!(hints.flag_completions(&cmd, "-"), vec!["--json", "-j", "--yaml", "--out"]);
    ///
    /// cmd.set_flag("json", "true").unwrap();
    /// let hints = cmd.enforce_flag_groups_for_completion();
    /// assert_eq!(hints.flag_completions(&cmd, "--"), vec!["--out"]);
    /// ```
    pub fn flag_completions(&self, cmd: &Command, to_complete: &str) -> Vec<String> {
        let mut completions = Vec::new();
        let candidates = cmd
            .all_flags()
            .filter(|flag| !flag.changed && !self.is_hidden(&flag.name));

        if to_complete.starts_with('-') {
            for flag in candidates {
                let long = format!("--{}", flag.name);
                if long.starts_with(to_complete) {
                    completions.push(long);
                }
                if to_complete == "-" {
                    if let Some(shorthand) = flag.shorthand {
                        completions.push(format!("-{shorthand}"));
                    }
                }
            }
        } else {
            completions.extend(
                candidates
                    .filter(|flag| self.is_required(&flag.name))
                    .map(|flag| format!("--{}", flag.name)),
            );
        }

        completions
    }
}

impl Command {
    /// Computes completion hints from the current flag state.
    ///
    /// Starting from each flag's own `hidden` and `required` settings:
    ///
    /// - in a required-together group with some member set, every unset
    ///   member becomes required;
    /// - in a one-required group with no member set, every member becomes
    ///   required;
    /// - in a mutually-exclusive group, every member other than a set one is
    ///   hidden.
    ///
    /// Nothing on the command is modified, so calling this repeatedly with the
    /// same flag state yields the same hints.
    pub fn enforce_flag_groups_for_completion(&self) -> CompletionHints {
        let mut hints = CompletionHints::default();
        for flag in self.all_flags() {
            let hint = hints.hint_mut(&flag.name);
            hint.hidden = flag.hidden;
            hint.required = flag.required && !flag.changed;
        }

        for group in self.flag_groups() {
            let set: Vec<&str> = group
                .flags
                .iter()
                .filter(|name| self.flag_changed(name))
                .map(String::as_str)
                .collect();

            match group.kind {
                FlagGroupKind::RequiredTogether => {
                    if !set.is_empty() {
                        for name in group.flags.iter().filter(|name| !set.contains(&name.as_str())) {
                            hints.hint_mut(name).required = true;
                        }
                    }
                }
                FlagGroupKind::OneRequired => {
                    if set.is_empty() {
                        for name in &group.flags {
                            hints.hint_mut(name).required = true;
                        }
                    }
                }
                FlagGroupKind::MutuallyExclusive => {
                    for chosen in &set {
                        for name in group.flags.iter().filter(|name| name != chosen) {
                            hints.hint_mut(name).hidden = true;
                        }
                    }
                }
            }
        }

        hints
    }
}
