use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use command_guard_core::{
    Command as GuardCommand, CommandDefinition, CompletionHints, FlagGroup, PositionalArgs,
};
use serde::Serialize;
use tracing::{Level, debug, info};

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum CliOutputFormat {
    Text,
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "command-guard")]
#[command(about = "Check positional arguments and flag groups against a command definition")]
struct Cli {
    /// Log progress to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate an invocation: positional arguments, required flags, flag groups.
    Check(CheckArgs),
    /// Suggest flags for the word being completed.
    Complete(CompleteArgs),
    /// List each command's argument rule, required flags and flag groups.
    Inspect(InspectArgs),
}

#[derive(Debug, Args)]
struct InvocationArgs {
    /// Command definition file (YAML, or JSON with a .json extension).
    definition: PathBuf,
    /// Sub-command below the root; repeat for deeper commands.
    #[arg(long = "command", value_name = "NAME")]
    path: Vec<String>,
    /// Flag given on the command line, as NAME or NAME=VALUE. A one-letter
    /// NAME that is not a long flag is looked up as a shorthand (`-v`).
    #[arg(long = "set", value_name = "FLAG", allow_hyphen_values = true)]
    set: Vec<String>,
}

#[derive(Debug, Args)]
struct CheckArgs {
    #[command(flatten)]
    invocation: InvocationArgs,
    /// Positional arguments, after `--`.
    #[arg(last = true)]
    args: Vec<String>,
}

#[derive(Debug, Args)]
struct CompleteArgs {
    #[command(flatten)]
    invocation: InvocationArgs,
    /// The partial word being completed.
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    current: String,
    /// Output format.
    #[arg(long, default_value = "text")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct InspectArgs {
    /// Command definition file (YAML, or JSON with a .json extension).
    definition: PathBuf,
    /// Output format.
    #[arg(long, default_value = "text")]
    format: CliOutputFormat,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Check(args) => run_check(args),
        Command::Complete(args) => run_complete(args),
        Command::Inspect(args) => run_inspect(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_definition(path: &Path) -> Result<CommandDefinition, String> {
    let raw = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let definition: CommandDefinition = if is_json {
        serde_json::from_str(&raw)
            .map_err(|err| format!("Failed to parse '{}': {err}", path.display()))?
    } else {
        serde_yaml::from_str(&raw)
            .map_err(|err| format!("Failed to parse '{}': {err}", path.display()))?
    };

    debug!(path = %path.display(), command = %definition.name, "loaded definition");
    Ok(definition)
}

fn build_root(path: &Path) -> Result<GuardCommand, String> {
    let definition = load_definition(path)?;
    definition
        .build()
        .map_err(|err| format!("Invalid definition '{}': {err}", path.display()))
}

/// Resolves the invoked command and records the flags given for it.
fn resolve_invocation(invocation: &InvocationArgs) -> Result<GuardCommand, String> {
    let root = build_root(&invocation.definition)?;
    let mut cmd = root.find(&invocation.path).ok_or_else(|| {
        format!(
            "unknown command path '{}' for '{}'",
            invocation.path.join(" "),
            root.name()
        )
    })?;
    debug!(command = %cmd.command_path(), "resolved command");

    for raw in &invocation.set {
        let (name, value) = parse_flag_assignment(raw);
        let name = resolve_flag_name(&cmd, name);
        cmd.set_flag(&name, value).map_err(|err| err.to_string())?;
        debug!(flag = %name, value, "flag set");
    }
    Ok(cmd)
}

/// Splits `NAME=VALUE`; a bare `NAME` means `true`. Leading dashes are ignored.
fn parse_flag_assignment(raw: &str) -> (&str, &str) {
    let raw = raw.trim_start_matches('-');
    raw.split_once('=').unwrap_or((raw, "true"))
}

/// Maps a one-letter name to the long name of the flag using it as shorthand,
/// unless a long flag already has that name.
fn resolve_flag_name(cmd: &GuardCommand, name: &str) -> String {
    let mut chars = name.chars();
    if let (Some(short), None) = (chars.next(), chars.next()) {
        if cmd.lookup_flag(name).is_none() {
            if let Some(flag) = cmd.lookup_shorthand(short) {
                return flag.name.clone();
            }
        }
    }
    name.to_string()
}

fn run_check(args: CheckArgs) -> Result<(), String> {
    let cmd = resolve_invocation(&args.invocation)?;
    cmd.validate(&args.args).map_err(|err| err.to_string())?;

    info!(command = %cmd.command_path(), args = args.args.len(), "invocation accepted");
    println!("ok");
    Ok(())
}

#[derive(Serialize)]
struct CompletionOutput<'a> {
    command: String,
    candidates: Vec<String>,
    hints: &'a CompletionHints,
}

fn run_complete(args: CompleteArgs) -> Result<(), String> {
    let cmd = resolve_invocation(&args.invocation)?;
    let hints = cmd.enforce_flag_groups_for_completion();
    let candidates = hints.flag_completions(&cmd, &args.current);
    debug!(
        command = %cmd.command_path(),
        current = %args.current,
        candidates = candidates.len(),
        "computed completions"
    );

    match args.format {
        CliOutputFormat::Text => {
            for candidate in &candidates {
                println!("{candidate}");
            }
        }
        format => {
            let output = CompletionOutput {
                command: cmd.command_path(),
                candidates,
                hints: &hints,
            };
            print!("{}", render(&output, format)?);
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct CommandReport<'a> {
    command: String,
    #[serde(serialize_with = "serde_yaml::with::singleton_map_recursive::serialize")]
    args: &'a PositionalArgs,
    required_flags: Vec<&'a str>,
    groups: &'a [FlagGroup],
}

fn collect_reports<'a>(cmd: &'a GuardCommand, reports: &mut Vec<CommandReport<'a>>) {
    reports.push(CommandReport {
        command: cmd.command_path(),
        args: cmd.args_rule(),
        required_flags: cmd
            .flags()
            .iter()
            .filter(|flag| flag.required)
            .map(|flag| flag.name.as_str())
            .collect(),
        groups: cmd.flag_groups(),
    });
    for sub in cmd.subcommands() {
        collect_reports(sub, reports);
    }
}

fn run_inspect(args: InspectArgs) -> Result<(), String> {
    let root = build_root(&args.definition)?;
    let mut reports = Vec::new();
    collect_reports(&root, &mut reports);
    info!(commands = reports.len(), "inspected definition");

    match args.format {
        CliOutputFormat::Text => {
            for report in &reports {
                println!("{}", report.command);
                let rule = serde_json::to_string(report.args)
                    .map_err(|err| format!("Failed to serialize argument rule: {err}"))?;
                println!("  args: {rule}");
                if !report.required_flags.is_empty() {
                    println!("  required: {}", report.required_flags.join(", "));
                }
                for group in report.groups {
                    println!("  {}: [{}]", group.kind, group.key());
                }
            }
        }
        format => print!("{}", render(&reports, format)?),
    }
    Ok(())
}

fn render<T: Serialize>(value: &T, format: CliOutputFormat) -> Result<String, String> {
    match format {
        CliOutputFormat::Yaml => serde_yaml::to_string(value)
            .map_err(|err| format!("Failed to serialize output: {err}")),
        _ => serde_json::to_string_pretty(value)
            .map(|json| format!("{json}\n"))
            .map_err(|err| format!("Failed to serialize output: {err}")),
    }
}
