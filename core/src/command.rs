//! The command: metadata the rules inspect plus the flags they check.
//!
//! A [`Command`] is built once, before any arguments are parsed: flags are
//! added, groups and required flags are marked, sub-commands attached. The
//! host then resolves the invoked command with [`Command::find`], records the
//! flags it parsed with [`Command::set_flag`], and runs
//! [`Command::validate`].

use crate::args::{ArgsError, PositionalArgs};
use crate::error::{DefinitionError, Error, FlagError};
use crate::flags::{Flag, FlagSet, RequiredFlagsError};
use crate::groups::{FlagGroup, GroupMembership};
use crate::suggest::{DEFAULT_SUGGESTIONS_MINIMUM_DISTANCE, suggestions_for};

/// A command in a command tree.
///
/// # Examples
///
/// ```
/// use command_guard_core::{Command, Flag, PositionalArgs};
///
/// let mut root = Command::new("app").with_flag(Flag::new("config").persistent());
/// root.add_subcommand(
///     Command::new("serve")
///         .with_alias("s")
///         .with_args(PositionalArgs::MaximumNArgs(1))
///         .with_flag(Flag::new("port")),
/// );
///
/// let mut serve = root.find(&["s"]).unwrap();
/// assert_eq!(serve.command_path(), "app serve");
/// assert!(serve.lookup_flag("config").is_some());
///
/// serve.set_flag("port", "8080").unwrap();
/// assert!(serve.validate(&["./public"]).is_ok());
/// assert!(serve.validate(&["a", "b"]).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Command {
    name: String,
    aliases: Vec<String>,
    hidden: bool,
    valid_args: Vec<String>,
    args: PositionalArgs,
    parent_path: Option<String>,
    subcommands: Vec<Command>,
    flags: FlagSet,
    inherited: FlagSet,
    disable_suggestions: bool,
    suggestions_minimum_distance: usize,
    pub(crate) flag_groups: Vec<FlagGroup>,
}

impl Command {
    /// Creates a command with no flags, sub-commands or argument rule.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            suggestions_minimum_distance: DEFAULT_SUGGESTIONS_MINIMUM_DISTANCE,
            ..Default::default()
        }
    }

    /// Adds an alternative name.
    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    /// Hides the command from suggestions. It can still be invoked.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Sets the values [`PositionalArgs::OnlyValidArgs`] accepts.
    ///
    /// An entry may carry a description after a tab (`"json\tJSON output"`);
    /// only the part before the tab is an accepted value.
    pub fn with_valid_args<I, S>(mut self, valid: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.valid_args = valid.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the positional argument rule.
    pub fn with_args(mut self, args: PositionalArgs) -> Self {
        self.args = args;
        self
    }

    /// Adds a local flag.
    ///
    /// # Panics
    ///
    /// Panics if the flag's name or shorthand is already defined locally.
    pub fn with_flag(mut self, flag: Flag) -> Self {
        self.flags.add(flag);
        self
    }

    /// Turns off "did you mean" suggestions for unknown sub-commands.
    pub fn without_suggestions(mut self) -> Self {
        self.disable_suggestions = true;
        self
    }

    /// Sets how many edits away a sub-command name may be and still be
    /// suggested.
    pub fn with_suggestions_minimum_distance(mut self, distance: usize) -> Self {
        self.suggestions_minimum_distance = distance;
        self
    }

    /// Attaches a sub-command, making this command its parent.
    pub fn add_subcommand(&mut self, mut child: Command) {
        child.set_parent_path(self.command_path());
        self.subcommands.push(child);
    }

    fn set_parent_path(&mut self, parent: String) {
        self.parent_path = Some(parent);
        let path = self.command_path();
        for child in &mut self.subcommands {
            child.set_parent_path(path.clone());
        }
    }

    /// The command's own name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Alternative names.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Whether the command is hidden.
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// The full space-separated path from the root, used in messages.
    pub fn command_path(&self) -> String {
        match &self.parent_path {
            Some(parent) => format!("{parent} {}", self.name),
            None => self.name.clone(),
        }
    }

    /// Whether the command was attached to a parent.
    pub fn has_parent(&self) -> bool {
        self.parent_path.is_some()
    }

    /// Whether the command has any sub-commands.
    pub fn has_subcommands(&self) -> bool {
        !self.subcommands.is_empty()
    }

    /// Direct sub-commands.
    pub fn subcommands(&self) -> &[Command] {
        &self.subcommands
    }

    /// Every name and alias of every direct sub-command, hidden ones included.
    pub fn subcommand_names(&self) -> impl Iterator<Item = &str> {
        self.subcommands.iter().flat_map(|sub| {
            std::iter::once(sub.name.as_str()).chain(sub.aliases.iter().map(String::as_str))
        })
    }

    /// Finds a direct sub-command by name or alias.
    pub fn find_subcommand(&self, name: &str) -> Option<&Command> {
        self.subcommands
            .iter()
            .find(|sub| sub.name == name || sub.aliases.iter().any(|alias| alias == name))
    }

    /// Visible sub-command names close to `typed`.
    pub fn suggestions_for(&self, typed: &str) -> Vec<String> {
        if self.disable_suggestions {
            return Vec::new();
        }
        suggestions_for(
            typed,
            self.subcommands
                .iter()
                .filter(|sub| !sub.hidden)
                .map(|sub| sub.name.as_str()),
            self.suggestions_minimum_distance,
        )
    }

    /// Declared valid arguments, descriptions included.
    pub fn valid_args(&self) -> &[String] {
        &self.valid_args
    }

    /// Declared valid arguments with any tab-separated description removed.
    pub fn valid_arg_names(&self) -> impl Iterator<Item = &str> {
        self.valid_args
            .iter()
            .map(|entry| entry.split_once('\t').map_or(entry.as_str(), |(name, _)| name))
    }

    /// The positional argument rule.
    pub fn args_rule(&self) -> &PositionalArgs {
        &self.args
    }

    /// Flags defined on this command.
    pub fn flags(&self) -> &FlagSet {
        &self.flags
    }

    /// Flags defined on this command, for modification.
    pub fn flags_mut(&mut self) -> &mut FlagSet {
        &mut self.flags
    }

    /// Persistent flags inherited from ancestors, as filled in by
    /// [`find`](Self::find).
    pub fn inherited_flags(&self) -> &FlagSet {
        &self.inherited
    }

    /// Local flags followed by inherited ones.
    pub fn all_flags(&self) -> impl Iterator<Item = &Flag> {
        self.flags.iter().chain(self.inherited.iter())
    }

    /// Finds a flag in the effective flag set, local flags first.
    pub fn lookup_flag(&self, name: &str) -> Option<&Flag> {
        self.flags.lookup(name).or_else(|| self.inherited.lookup(name))
    }

    /// Finds a flag in the effective flag set by its one-letter form, local
    /// flags first.
    pub fn lookup_shorthand(&self, shorthand: char) -> Option<&Flag> {
        self.flags
            .lookup_shorthand(shorthand)
            .or_else(|| self.inherited.lookup_shorthand(shorthand))
    }

    /// Whether the named flag was explicitly set.
    pub fn flag_changed(&self, name: &str) -> bool {
        self.lookup_flag(name).is_some_and(|flag| flag.changed)
    }

    /// Records that a flag in the effective set was given on the command line.
    ///
    /// # Errors
    ///
    /// [`FlagError::Unknown`] if neither the command nor its ancestors define
    /// the flag.
    pub fn set_flag(&mut self, name: &str, value: impl Into<String>) -> Result<(), FlagError> {
        let flag = match self.flags.lookup_mut(name) {
            Some(flag) => flag,
            None => self
                .inherited
                .lookup_mut(name)
                .ok_or_else(|| FlagError::Unknown(name.to_string()))?,
        };
        flag.set(value);
        Ok(())
    }

    /// Marks a local flag as required.
    ///
    /// # Panics
    ///
    /// Panics if the flag is not defined locally.
    pub fn mark_flag_required(&mut self, name: &str) {
        if let Err(err) = self.try_mark_flag_required(name) {
            panic!("{err}");
        }
    }

    /// Marks a local flag as required, reporting an unknown name.
    pub fn try_mark_flag_required(&mut self, name: &str) -> Result<(), DefinitionError> {
        let flag = self
            .flags
            .lookup_mut(name)
            .ok_or_else(|| DefinitionError::UnknownRequiredFlag(name.to_string()))?;
        flag.required = true;
        Ok(())
    }

    /// Checks that every required flag in the effective set was given.
    pub fn validate_required_flags(&self) -> Result<(), RequiredFlagsError> {
        let missing: Vec<String> = self
            .all_flags()
            .filter(|flag| flag.required && !flag.changed)
            .map(|flag| flag.name.clone())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(RequiredFlagsError { missing })
        }
    }

    /// Checks positional arguments against the command's rule.
    pub fn validate_args<S: AsRef<str>>(&self, args: &[S]) -> Result<(), ArgsError> {
        self.args.validate(self, args)
    }

    /// Runs every check for an invocation: positional arguments, then
    /// required flags, then flag groups. Stops at the first stage that fails.
    pub fn validate<S: AsRef<str>>(&self, args: &[S]) -> Result<(), Error> {
        self.validate_args(args)?;
        self.validate_required_flags()?;
        self.validate_flag_groups()?;
        Ok(())
    }

    /// Resolves the sub-command at `path` (names or aliases).
    ///
    /// Returns a copy whose inherited flag set holds the persistent flags of
    /// every ancestor on the way down, nearest first. A local flag shadows an
    /// inherited one with the same name. When two flags claim the same
    /// shorthand, the nearer one keeps it and the farther one stays reachable
    /// by its long name only. An empty path resolves to a copy of `self`.
    pub fn find<S: AsRef<str>>(&self, path: &[S]) -> Option<Command> {
        let mut chain: Vec<&Command> = vec![self];
        for segment in path {
            let next = chain.last().copied()?.find_subcommand(segment.as_ref())?;
            chain.push(next);
        }

        let target = chain.pop()?;
        let mut resolved = target.clone();

        let ancestor_flags = chain
            .iter()
            .rev()
            .copied()
            .flat_map(|ancestor| ancestor.flags.iter().filter(|flag| flag.persistent))
            .chain(self.inherited.iter());

        let mut inherited = target.inherited.clone();
        for flag in ancestor_flags {
            // nearer definitions shadow farther ones by name
            if resolved.flags.lookup(&flag.name).is_some()
                || inherited.lookup(&flag.name).is_some()
            {
                continue;
            }
            let mut flag = flag.clone();
            // group ids belong to the declaring command
            flag.groups = GroupMembership::default();
            if let Some(shorthand) = flag.shorthand {
                let taken = resolved.flags.lookup_shorthand(shorthand).is_some()
                    || inherited.lookup_shorthand(shorthand).is_some();
                if taken {
                    flag.shorthand = None;
                }
            }
            inherited.add(flag);
        }
        resolved.inherited = inherited;
        Some(resolved)
    }
}
