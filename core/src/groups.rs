//! Flag groups: declaring relational constraints between flags and checking
//! them once flags have been parsed.
//!
//! Three kinds of group exist:
//!
//! - [`FlagGroupKind::RequiredTogether`]: if any flag of the group is set, all
//!   of them must be.
//! - [`FlagGroupKind::OneRequired`]: at least one flag of the group must be set.
//! - [`FlagGroupKind::MutuallyExclusive`]: at most one flag of the group may be
//!   set.
//!
//! Each declaration becomes a [`FlagGroup`] in the command's group list and
//! every member flag records the group's [`GroupId`] in its
//! [`GroupMembership`]. Groups are independent of each other; a flag may belong
//! to any number of them.
//!
//! # Examples
//!
//! ```
//! use command_guard_core::{Command, Flag};
//!
//! let mut cmd = Command::new("deploy")
//!     .with_flag(Flag::new("user"))
//!     .with_flag(Flag::new("password"))
//!     .with_flag(Flag::new("json"))
//!     .with_flag(Flag::new("yaml"));
//! cmd.mark_flags_required_together(&["user", "password"]);
//! cmd.mark_flags_mutually_exclusive(&["json", "yaml"]);
//!
//! cmd.set_flag("user", "admin").unwrap();
//! cmd.set_flag("json", "true").unwrap();
//! cmd.set_flag("yaml", "true").unwrap();
//!
//! let errors = cmd.validate_flag_groups().unwrap_err();
//! assert_eq!(errors.len(), 2);
//! assert_eq!(
//!     errors.to_string(),
//!     "if any flags in the group [user password] are set they must all be set; missing [password]\n\
//!      if any flags in the group [json yaml] are set none of the others can be; [json yaml] were all set"
//! );
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::command::Command;
use crate::error::DefinitionError;

/// The constraint a flag group enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagGroupKind {
    /// All or none of the flags must be set.
    RequiredTogether,
    /// At least one of the flags must be set.
    OneRequired,
    /// At most one of the flags may be set.
    MutuallyExclusive,
}

impl FlagGroupKind {
    /// All kinds, in the order violations are reported.
    pub const ALL: [FlagGroupKind; 3] = [
        FlagGroupKind::RequiredTogether,
        FlagGroupKind::OneRequired,
        FlagGroupKind::MutuallyExclusive,
    ];
}

impl fmt::Display for FlagGroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FlagGroupKind::RequiredTogether => "required together",
            FlagGroupKind::OneRequired => "one required",
            FlagGroupKind::MutuallyExclusive => "mutually exclusive",
        })
    }
}

/// Stable identity of a declared flag group within its command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(pub usize);

/// One flag group declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagGroup {
    /// Identity, unique within the declaring command.
    pub id: GroupId,
    /// The constraint the group enforces.
    pub kind: FlagGroupKind,
    /// Member flag names, in declaration order.
    pub flags: Vec<String>,
}

impl FlagGroup {
    /// The space-joined member names, as shown to users.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_guard_core::{FlagGroup, FlagGroupKind, GroupId};
    ///
    /// let group = FlagGroup {
    ///     id: GroupId(0),
    ///     kind: FlagGroupKind::OneRequired,
    ///     flags: vec!["c".into(), "a".into(), "b".into()],
    /// };
    /// assert_eq!(group.key(), "c a b");
    /// ```
    pub fn key(&self) -> String {
        self.flags.join(" ")
    }

    /// Member names that are currently set, sorted and de-duplicated.
    fn set_members(&self, cmd: &Command) -> Vec<String> {
        let mut set: Vec<String> = self
            .flags
            .iter()
            .filter(|name| cmd.flag_changed(name))
            .cloned()
            .collect();
        set.sort();
        set.dedup();
        set
    }

    /// Member names that are not set, sorted and de-duplicated.
    fn unset_members(&self, cmd: &Command) -> Vec<String> {
        let mut unset: Vec<String> = self
            .flags
            .iter()
            .filter(|name| !cmd.flag_changed(name))
            .cloned()
            .collect();
        unset.sort();
        unset.dedup();
        unset
    }

    /// Checks the group against the command's current flag state.
    pub fn check(&self, cmd: &Command) -> Result<(), FlagGroupError> {
        let group = self.flags.clone();
        match self.kind {
            FlagGroupKind::RequiredTogether => {
                let set = self.set_members(cmd);
                let missing = self.unset_members(cmd);
                if !set.is_empty() && !missing.is_empty() {
                    return Err(FlagGroupError::RequiredTogether { group, missing });
                }
            }
            FlagGroupKind::OneRequired => {
                if self.set_members(cmd).is_empty() {
                    return Err(FlagGroupError::OneRequired { group });
                }
            }
            FlagGroupKind::MutuallyExclusive => {
                let set = self.set_members(cmd);
                if set.len() > 1 {
                    return Err(FlagGroupError::MutuallyExclusive { group, set });
                }
            }
        }
        Ok(())
    }
}

/// The groups a single flag belongs to, by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupMembership {
    /// Required-together groups.
    pub required_together: Vec<GroupId>,
    /// One-required groups.
    pub one_required: Vec<GroupId>,
    /// Mutually-exclusive groups.
    pub mutually_exclusive: Vec<GroupId>,
}

impl GroupMembership {
    /// Groups of the given kind.
    pub fn of_kind(&self, kind: FlagGroupKind) -> &[GroupId] {
        match kind {
            FlagGroupKind::RequiredTogether => &self.required_together,
            FlagGroupKind::OneRequired => &self.one_required,
            FlagGroupKind::MutuallyExclusive => &self.mutually_exclusive,
        }
    }

    fn push(&mut self, kind: FlagGroupKind, id: GroupId) {
        let ids = match kind {
            FlagGroupKind::RequiredTogether => &mut self.required_together,
            FlagGroupKind::OneRequired => &mut self.one_required,
            FlagGroupKind::MutuallyExclusive => &mut self.mutually_exclusive,
        };
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    /// Whether the flag belongs to no group at all.
    pub fn is_empty(&self) -> bool {
        self.required_together.is_empty()
            && self.one_required.is_empty()
            && self.mutually_exclusive.is_empty()
    }
}

/// A single violated flag group.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlagGroupError {
    /// Some but not all flags of a required-together group were set.
    #[error(
        "if any flags in the group [{}] are set they must all be set; missing [{}]",
        .group.join(" "),
        .missing.join(" ")
    )]
    RequiredTogether {
        /// The group's members, in declaration order.
        group: Vec<String>,
        /// Members that were not set, sorted.
        missing: Vec<String>,
    },
    /// No flag of a one-required group was set.
    #[error("at least one of the flags in the group [{}] is required", .group.join(" "))]
    OneRequired {
        /// The group's members, in declaration order.
        group: Vec<String>,
    },
    /// More than one flag of a mutually-exclusive group was set.
    #[error(
        "if any flags in the group [{}] are set none of the others can be; [{}] were all set",
        .group.join(" "),
        .set.join(" ")
    )]
    MutuallyExclusive {
        /// The group's members, in declaration order.
        group: Vec<String>,
        /// Members that were set, sorted.
        set: Vec<String>,
    },
}

/// Every flag group violation found in one validation pass.
///
/// Renders one violation per line, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", render_lines(.violations))]
pub struct FlagGroupErrors {
    violations: Vec<FlagGroupError>,
}

impl FlagGroupErrors {
    /// Iterates violations in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &FlagGroupError> {
        self.violations.iter()
    }

    /// Number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Always `false`; an empty set of violations is never constructed.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Consumes the error, returning the violations.
    pub fn into_inner(self) -> Vec<FlagGroupError> {
        self.violations
    }
}

fn render_lines(violations: &[FlagGroupError]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

impl Command {
    /// Declares that if any of `names` is set, all of them must be.
    ///
    /// # Panics
    ///
    /// Panics if a name is not a flag defined locally on this command, or if
    /// `names` is empty.
    pub fn mark_flags_required_together(&mut self, names: &[&str]) -> GroupId {
        self.mark_flag_group(FlagGroupKind::RequiredTogether, names)
    }

    /// Declares that at least one of `names` must be set.
    ///
    /// # Panics
    ///
    /// Panics if a name is not a flag defined locally on this command, or if
    /// `names` is empty.
    pub fn mark_flags_one_required(&mut self, names: &[&str]) -> GroupId {
        self.mark_flag_group(FlagGroupKind::OneRequired, names)
    }

    /// Declares that at most one of `names` may be set.
    ///
    /// # Panics
    ///
    /// Panics if a name is not a flag defined locally on this command, or if
    /// `names` is empty.
    pub fn mark_flags_mutually_exclusive(&mut self, names: &[&str]) -> GroupId {
        self.mark_flag_group(FlagGroupKind::MutuallyExclusive, names)
    }

    fn mark_flag_group(&mut self, kind: FlagGroupKind, names: &[&str]) -> GroupId {
        match self.try_mark_flag_group(kind, names) {
            Ok(id) => id,
            Err(err) => panic!("{err}"),
        }
    }

    /// Declares a flag group, reporting misuse instead of panicking.
    ///
    /// Declaring the same kind with the same names twice returns the existing
    /// group's id. Nothing is recorded when an error is returned.
    ///
    /// # Errors
    ///
    /// [`DefinitionError::EmptyGroup`] when `names` is empty, and
    /// [`DefinitionError::UnknownGroupFlag`] when a name is not a flag defined
    /// locally on this command (inherited flags do not count).
    pub fn try_mark_flag_group<S: AsRef<str>>(
        &mut self,
        kind: FlagGroupKind,
        names: &[S],
    ) -> Result<GroupId, DefinitionError> {
        if names.is_empty() {
            return Err(DefinitionError::EmptyGroup(kind));
        }
        for name in names {
            let name = name.as_ref();
            if self.flags().lookup(name).is_none() {
                return Err(DefinitionError::UnknownGroupFlag {
                    flag: name.to_string(),
                    kind,
                });
            }
        }

        let flags: Vec<String> = names.iter().map(|n| n.as_ref().to_string()).collect();
        if let Some(existing) = self
            .flag_groups
            .iter()
            .find(|group| group.kind == kind && group.flags == flags)
        {
            return Ok(existing.id);
        }

        let id = GroupId(self.flag_groups.len());
        for name in &flags {
            if let Some(flag) = self.flags_mut().lookup_mut(name) {
                flag.groups.push(kind, id);
            }
        }
        self.flag_groups.push(FlagGroup { id, kind, flags });
        Ok(id)
    }

    /// Declared flag groups, in declaration order.
    pub fn flag_groups(&self) -> &[FlagGroup] {
        &self.flag_groups
    }

    /// Looks up a declared group by id.
    pub fn flag_group(&self, id: GroupId) -> Option<&FlagGroup> {
        self.flag_groups.get(id.0)
    }

    /// Checks every declared flag group against the current flag state.
    ///
    /// Violations are gathered across all groups rather than stopping at the
    /// first: required-together groups first, then one-required, then
    /// mutually-exclusive, each in declaration order.
    pub fn validate_flag_groups(&self) -> Result<(), FlagGroupErrors> {
        let mut violations = Vec::new();
        for kind in FlagGroupKind::ALL {
            for group in self.flag_groups.iter().filter(|group| group.kind == kind) {
                if let Err(violation) = group.check(self) {
                    violations.push(violation);
                }
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(FlagGroupErrors { violations })
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Flag;

    use super::*;

    fn abc_command() -> Command {
        Command::new("testcmd")
            .with_flag(Flag::new("a"))
            .with_flag(Flag::new("b"))
            .with_flag(Flag::new("c"))
    }

    #[test]
    fn test_mark_records_membership_on_each_flag() {
        let mut cmd = abc_command();
        let together = cmd.mark_flags_required_together(&["a", "b", "c"]);
        let one = cmd.mark_flags_one_required(&["a", "b", "c"]);
        let exclusive = cmd.mark_flags_mutually_exclusive(&["a", "b", "c"]);

        for name in ["a", "b", "c"] {
            let groups = &cmd.flags().lookup(name).unwrap().groups;
            assert_eq!(groups.required_together, vec![together]);
            assert_eq!(groups.one_required, vec![one]);
            assert_eq!(groups.mutually_exclusive, vec![exclusive]);
        }
        assert_eq!(cmd.flag_group(together).unwrap().key(), "a b c");
    }

    #[test]
    fn test_mark_appends_without_overwriting() {
        let mut cmd = abc_command();
        let first = cmd.mark_flags_mutually_exclusive(&["a", "b"]);
        let second = cmd.mark_flags_mutually_exclusive(&["a", "c"]);

        assert_ne!(first, second);
        assert_eq!(
            cmd.flags().lookup("a").unwrap().groups.mutually_exclusive,
            vec![first, second]
        );
        assert_eq!(
            cmd.flags().lookup("b").unwrap().groups.of_kind(FlagGroupKind::MutuallyExclusive),
            &[first]
        );
        assert!(cmd.flags().lookup("c").unwrap().groups.required_together.is_empty());
    }

    #[test]
    fn test_key_keeps_declaration_order() {
        let mut cmd = abc_command();
        let id = cmd.mark_flags_one_required(&["c", "a"]);
        assert_eq!(cmd.flag_group(id).unwrap().key(), "c a");
    }

    #[test]
    fn test_identical_declaration_is_not_duplicated() {
        let mut cmd = abc_command();
        let first = cmd.mark_flags_one_required(&["a", "b"]);
        let again = cmd.mark_flags_one_required(&["a", "b"]);

        assert_eq!(first, again);
        assert_eq!(cmd.flag_groups().len(), 1);
        assert_eq!(cmd.flags().lookup("a").unwrap().groups.one_required, vec![first]);

        cmd.mark_flags_mutually_exclusive(&["a", "b"]);
        assert_eq!(cmd.flag_groups().len(), 2);
    }

    #[test]
    #[should_panic(expected = "failed to find flag \"d\"")]
    fn test_required_together_panics_on_unknown_flag() {
        let mut cmd = Command::new("testcmd");
        cmd.mark_flags_required_together(&["d"]);
    }

    #[test]
    #[should_panic(expected = "failed to find flag \"d\"")]
    fn test_one_required_panics_on_unknown_flag() {
        let mut cmd = abc_command();
        cmd.mark_flags_one_required(&["a", "d"]);
    }

    #[test]
    #[should_panic(expected = "failed to find flag \"d\"")]
    fn test_mutually_exclusive_panics_on_unknown_flag() {
        let mut cmd = Command::new("testcmd");
        cmd.mark_flags_mutually_exclusive(&["d"]);
    }

    #[test]
    #[should_panic(expected = "must name at least one flag")]
    fn test_empty_declaration_panics() {
        let mut cmd = abc_command();
        cmd.mark_flags_one_required(&[]);
    }

    #[test]
    fn test_try_mark_leaves_no_partial_membership() {
        let mut cmd = abc_command();
        let err = cmd
            .try_mark_flag_group(FlagGroupKind::RequiredTogether, &["a", "zz"])
            .unwrap_err();
        assert_eq!(
            err,
            DefinitionError::UnknownGroupFlag {
                flag: "zz".to_string(),
                kind: FlagGroupKind::RequiredTogether,
            }
        );
        assert!(cmd.flags().lookup("a").unwrap().groups.is_empty());
        assert!(cmd.flag_groups().is_empty());
    }

    #[test]
    fn test_inherited_flags_cannot_be_grouped() {
        let mut root = Command::new("root").with_flag(Flag::new("config").persistent());
        root.add_subcommand(Command::new("sub").with_flag(Flag::new("local")));
        let mut sub = root.find(&["sub"]).unwrap();

        assert!(sub.lookup_flag("config").is_some());
        let err = sub
            .try_mark_flag_group(FlagGroupKind::OneRequired, &["config", "local"])
            .unwrap_err();
        assert!(matches!(err, DefinitionError::UnknownGroupFlag { ref flag, .. } if flag == "config"));
    }

    #[test]
    fn test_required_together() {
        let mut cmd = abc_command();
        cmd.mark_flags_required_together(&["a", "b", "c"]);
        assert!(cmd.validate_flag_groups().is_ok());

        cmd.set_flag("a", "1").unwrap();
        cmd.set_flag("b", "1").unwrap();
        let errors = cmd.validate_flag_groups().unwrap_err();
        assert_eq!(
            errors.into_inner(),
            vec![FlagGroupError::RequiredTogether {
                group: vec!["a".into(), "b".into(), "c".into()],
                missing: vec!["c".into()],
            }]
        );

        cmd.set_flag("c", "1").unwrap();
        assert!(cmd.validate_flag_groups().is_ok());
    }

    #[test]
    fn test_one_required() {
        let mut cmd = abc_command();
        cmd.mark_flags_one_required(&["a", "b"]);

        let errors = cmd.validate_flag_groups().unwrap_err();
        assert_eq!(
            errors.to_string(),
            "at least one of the flags in the group [a b] is required"
        );

        cmd.set_flag("b", "1").unwrap();
        assert!(cmd.validate_flag_groups().is_ok());

        cmd.set_flag("a", "1").unwrap();
        assert!(cmd.validate_flag_groups().is_ok());
    }

    #[test]
    fn test_mutually_exclusive() {
        let mut cmd = abc_command();
        cmd.mark_flags_mutually_exclusive(&["a", "b"]);
        assert!(cmd.validate_flag_groups().is_ok());

        cmd.set_flag("a", "1").unwrap();
        assert!(cmd.validate_flag_groups().is_ok());

        cmd.set_flag("b", "1").unwrap();
        let errors = cmd.validate_flag_groups().unwrap_err();
        assert_eq!(
            errors.to_string(),
            "if any flags in the group [a b] are set none of the others can be; [a b] were all set"
        );
    }

    #[test]
    fn test_missing_and_set_lists_are_sorted() {
        let mut cmd = abc_command();
        cmd.mark_flags_required_together(&["c", "b", "a"]);
        cmd.mark_flags_mutually_exclusive(&["c", "a"]);
        cmd.set_flag("c", "1").unwrap();
        cmd.set_flag("a", "1").unwrap();

        let errors: Vec<String> = cmd
            .validate_flag_groups()
            .unwrap_err()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            errors,
            vec![
                "if any flags in the group [c b a] are set they must all be set; missing [b]",
                "if any flags in the group [c a] are set none of the others can be; [a c] were all set",
            ]
        );
    }

    #[test]
    fn test_all_violations_are_reported_together() {
        let mut cmd = abc_command();
        cmd.mark_flags_required_together(&["a", "b"]);
        cmd.mark_flags_one_required(&["c"]);
        assert_eq!(cmd.validate_flag_groups().unwrap_err().len(), 1);

        cmd.set_flag("a", "1").unwrap();
        let errors = cmd.validate_flag_groups().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.to_string(),
            "if any flags in the group [a b] are set they must all be set; missing [b]\n\
             at least one of the flags in the group [c] is required"
        );

        cmd.set_flag("c", "1").unwrap();
        cmd.set_flag("b", "1").unwrap();
        assert!(cmd.validate_flag_groups().is_ok());
    }

    #[test]
    fn test_kind_order_beats_declaration_order() {
        let mut cmd = abc_command();
        cmd.mark_flags_mutually_exclusive(&["a", "b"]);
        cmd.mark_flags_one_required(&["c"]);
        cmd.mark_flags_required_together(&["a", "c"]);
        cmd.set_flag("a", "1").unwrap();
        cmd.set_flag("b", "1").unwrap();

        let kinds: Vec<&'static str> = cmd
            .validate_flag_groups()
            .unwrap_err()
            .iter()
            .map(|violation| match violation {
                FlagGroupError::RequiredTogether { .. } => "together",
                FlagGroupError::OneRequired { .. } => "one",
                FlagGroupError::MutuallyExclusive { .. } => "exclusive",
            })
            .collect();
        assert_eq!(kinds, vec!["together", "one", "exclusive"]);
    }

    #[test]
    fn test_groups_are_independent() {
        let mut cmd = abc_command();
        cmd.mark_flags_one_required(&["a", "b"]);
        cmd.mark_flags_mutually_exclusive(&["a", "c"]);
        cmd.set_flag("a", "1").unwrap();
        cmd.set_flag("c", "1").unwrap();

        let errors = cmd.validate_flag_groups().unwrap_err().into_inner();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], FlagGroupError::MutuallyExclusive { .. }));
    }

    #[test]
    fn test_repeated_name_counts_once() {
        let mut cmd = abc_command();
        cmd.mark_flags_required_together(&["a", "a"]);
        cmd.set_flag("a", "1").unwrap();
        assert!(cmd.validate_flag_groups().is_ok());

        let mut cmd = abc_command();
        cmd.mark_flags_mutually_exclusive(&["a", "a"]);
        cmd.set_flag("a", "1").unwrap();
        assert!(cmd.validate_flag_groups().is_ok());
    }
}
