use std::fs;
use std::path::PathBuf;
use std::process::Output;

use tempfile::TempDir;

const DEPLOY_YAML: &str = r#"
name: deploy
valid_args: [staging, production]
args:
  match_all:
    - maximum_n_args: 1
    - only_valid_args
flags:
  - name: config
    persistent: true
  - name: env
    shorthand: e
    required: true
  - name: json
  - name: yaml
  - name: user
  - name: password
groups:
  required_together:
    - [user, password]
  mutually_exclusive:
    - [json, yaml]
subcommands:
  - name: rollback
    aliases: [rb]
    args: no_args
    flags:
      - name: to
      - name: latest
    groups:
      one_required:
        - [to, latest]
  - name: status
"#;

fn write_definition(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("failed to write definition");
    path
}

fn run(args: &[&str]) -> Output {
    std::process::Command::new(env!("CARGO_BIN_EXE_command-guard"))
        .args(args)
        .output()
        .expect("failed to run command-guard")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_accepts_valid_invocation() {
    let dir = TempDir::new().unwrap();
    let definition = write_definition(&dir, "deploy.yaml", DEPLOY_YAML);

    let output = run(&[
        "check",
        definition.to_str().unwrap(),
        "--set",
        "env=eu",
        "--set",
        "json",
        "--",
        "staging",
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "ok");
}

#[test]
fn check_rejects_invalid_positional() {
    let dir = TempDir::new().unwrap();
    let definition = write_definition(&dir, "deploy.yaml", DEPLOY_YAML);

    let output = run(&[
        "check",
        definition.to_str().unwrap(),
        "--set",
        "env=eu",
        "--",
        "qa",
    ]);

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));
    assert!(
        stderr(&output).contains(
            "error: invalid argument \"qa\" for \"deploy\"; valid arguments: production, staging"
        ),
        "stderr: {}",
        stderr(&output)
    );
}

#[test]
fn check_reports_missing_required_flag() {
    let dir = TempDir::new().unwrap();
    let definition = write_definition(&dir, "deploy.yaml", DEPLOY_YAML);

    let output = run(&["check", definition.to_str().unwrap()]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains(r#"required flag(s) "env" not set"#));
}

#[test]
fn check_reports_every_group_violation() {
    let dir = TempDir::new().unwrap();
    let definition = write_definition(&dir, "deploy.yaml", DEPLOY_YAML);

    let output = run(&[
        "check",
        definition.to_str().unwrap(),
        "--set",
        "env=eu",
        "--set",
        "user=me",
        "--set",
        "json",
        "--set",
        "yaml",
    ]);

    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains(
        "if any flags in the group [user password] are set they must all be set; missing [password]"
    ));
    assert!(err.contains(
        "if any flags in the group [json yaml] are set none of the others can be; [json yaml] were all set"
    ));
}

#[test]
fn check_resolves_subcommand_by_alias_with_inherited_flags() {
    let dir = TempDir::new().unwrap();
    let definition = write_definition(&dir, "deploy.yaml", DEPLOY_YAML);

    let output = run(&[
        "check",
        definition.to_str().unwrap(),
        "--command",
        "rb",
        "--set",
        "config=prod.toml",
        "--set",
        "latest",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let output = run(&[
        "check",
        definition.to_str().unwrap(),
        "--command",
        "rollback",
    ]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("at least one of the flags in the group [to latest] is required"));
}

#[test]
fn check_unknown_subcommand_suggests_close_names() {
    let dir = TempDir::new().unwrap();
    let definition = write_definition(
        &dir,
        "app.yaml",
        "name: app\nsubcommands:\n  - name: status\n  - name: stash\n",
    );

    let output = run(&["check", definition.to_str().unwrap(), "--", "statsu"]);

    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("unknown command \"statsu\" for \"app\""), "stderr: {err}");
    assert!(err.contains("Did you mean this?"));
    assert!(err.contains("\tstatus"));
}

#[test]
fn check_accepts_flag_shorthand() {
    let dir = TempDir::new().unwrap();
    let definition = write_definition(&dir, "deploy.yaml", DEPLOY_YAML);

    let output = run(&[
        "check",
        definition.to_str().unwrap(),
        "--set",
        "-e=eu",
        "--",
        "production",
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "ok");
}

#[test]
fn check_rejects_unknown_flag() {
    let dir = TempDir::new().unwrap();
    let definition = write_definition(&dir, "deploy.yaml", DEPLOY_YAML);

    let output = run(&["check", definition.to_str().unwrap(), "--set", "bogus"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("unknown flag: --bogus"));
}

#[test]
fn check_reports_bad_definition_instead_of_panicking() {
    let dir = TempDir::new().unwrap();
    let definition = write_definition(
        &dir,
        "broken.json",
        r#"{"name": "broken", "flags": [{"name": "a"}], "groups": {"required_together": [["a", "d"]]}}"#,
    );

    let output = run(&["check", definition.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
    assert!(
        stderr(&output).contains("failed to find flag \"d\""),
        "stderr: {}",
        stderr(&output)
    );
}

#[test]
fn check_unknown_command_path() {
    let dir = TempDir::new().unwrap();
    let definition = write_definition(&dir, "deploy.yaml", DEPLOY_YAML);

    let output = run(&["check", definition.to_str().unwrap(), "--command", "nope"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("unknown command path 'nope' for 'deploy'"));
}

// ---------------------------------------------------------------------------
// complete
// ---------------------------------------------------------------------------

#[test]
fn complete_points_at_missing_flags() {
    let dir = TempDir::new().unwrap();
    let definition = write_definition(&dir, "deploy.yaml", DEPLOY_YAML);

    let output = run(&[
        "complete",
        definition.to_str().unwrap(),
        "--set",
        "user=me",
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let lines: Vec<String> = stdout(&output).lines().map(String::from).collect();
    assert_eq!(lines, vec!["--env", "--password"]);
}

#[test]
fn complete_hides_mutually_exclusive_flags() {
    let dir = TempDir::new().unwrap();
    let definition = write_definition(&dir, "deploy.yaml", DEPLOY_YAML);

    let output = run(&[
        "complete",
        definition.to_str().unwrap(),
        "--set",
        "json",
        "--current=--",
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let lines: Vec<String> = stdout(&output).lines().map(String::from).collect();
    assert_eq!(lines, vec!["--config", "--env", "--user", "--password"]);
}

#[test]
fn complete_json_output_includes_hints() {
    let dir = TempDir::new().unwrap();
    let definition = write_definition(&dir, "deploy.yaml", DEPLOY_YAML);

    let output = run(&[
        "complete",
        definition.to_str().unwrap(),
        "--command",
        "rollback",
        "--format",
        "json",
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["command"], "deploy rollback");
    assert_eq!(
        value["candidates"],
        serde_json::json!(["--to", "--latest"])
    );
    assert_eq!(value["hints"]["to"]["required"], true);
    assert_eq!(value["hints"]["config"]["required"], false);
}

// ---------------------------------------------------------------------------
// inspect
// ---------------------------------------------------------------------------

#[test]
fn inspect_lists_groups_per_command() {
    let dir = TempDir::new().unwrap();
    let definition = write_definition(&dir, "deploy.yaml", DEPLOY_YAML);

    let output = run(&["inspect", definition.to_str().unwrap()]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("deploy\n"));
    assert!(out.contains("  required: env\n"));
    assert!(out.contains("  required together: [user password]\n"));
    assert!(out.contains("  mutually exclusive: [json yaml]\n"));
    assert!(out.contains("deploy rollback\n  args: \"no_args\"\n  one required: [to latest]\n"));
    assert!(out.contains("deploy status\n  args: \"legacy_args\"\n"));
}

#[test]
fn inspect_json_output() {
    let dir = TempDir::new().unwrap();
    let definition = write_definition(&dir, "deploy.yaml", DEPLOY_YAML);

    let output = run(&["inspect", definition.to_str().unwrap(), "--format", "json"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let reports = value.as_array().unwrap();
    assert_eq!(reports.len(), 3);
    assert_eq!(reports[0]["groups"][0]["kind"], "required_together");
    assert_eq!(
        reports[0]["groups"][1]["flags"],
        serde_json::json!(["json", "yaml"])
    );
    assert_eq!(reports[1]["args"], "no_args");
}

#[test]
fn inspect_yaml_output_writes_rules_as_maps() {
    let dir = TempDir::new().unwrap();
    let definition = write_definition(&dir, "deploy.yaml", DEPLOY_YAML);

    let output = run(&["inspect", definition.to_str().unwrap(), "--format", "yaml"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("match_all:"), "stdout: {out}");
    assert!(out.contains("maximum_n_args: 1"), "stdout: {out}");
    assert!(!out.contains('!'), "stdout: {out}");
}
