//! CLI smoke tests: run the `jnav` binary and check its output contract.

mod common;

use serde_json::Value;

fn fixture_arg() -> String {
    common::fixture_path().to_string_lossy().into_owned()
}

#[test]
fn help_command_prints_usage() {
    let result = common::run_cli_case("help_command_prints_usage", &["--help"]);
    assert!(
        result.status.success(),
        "expected success; log: {}",
        result.log_path.display()
    );
    assert!(
        result.stdout.contains("Usage: jnav [OPTIONS] <COMMAND>"),
        "missing help banner; log: {}",
        result.log_path.display()
    );
}

#[test]
fn version_command_prints_version() {
    let result = common::run_cli_case("version_command_prints_version", &["--version"]);
    assert!(result.status.success(), "log: {}", result.log_path.display());
    assert!(result.stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn replay_reproduces_journal_flow() {
    let entries = fixture_arg();
    let result = common::run_cli_case(
        "replay_reproduces_journal_flow",
        &[
            "--json", "replay", "--entries", &entries, "click:0", "settings", "back", "back",
        ],
    );
    assert!(
        result.status.success(),
        "expected success; log: {}",
        result.log_path.display()
    );

    let lines = common::json_lines(&result.stdout);
    assert_eq!(lines.len(), 5, "log: {}", result.log_path.display());

    let steps: Vec<&str> = lines.iter().map(|l| l["step"].as_str().unwrap()).collect();
    assert_eq!(steps, ["start", "click:0", "settings", "back", "back"]);

    let headers: Vec<&str> = lines
        .iter()
        .map(|l| l["view"]["header"].as_str().unwrap())
        .collect();
    assert_eq!(
        headers,
        ["Journal Entries", "Entry 1", "Settings", "Entry 1", "Journal Entries"]
    );

    let classes: Vec<&str> = lines
        .iter()
        .map(|l| l["view"]["body_class"].as_str().unwrap())
        .collect();
    assert_eq!(classes, ["", "single-entry", "settings", "single-entry", ""]);

    assert_eq!(lines[0]["view"]["summary_count"], 10);
    assert_eq!(lines[1]["view"]["url"], "http://127.0.0.1:5500/#entry1");
    assert_eq!(lines[1]["view"]["entry"]["title"], "You like jazz?");
    assert_eq!(lines[4]["view"]["url"], "http://127.0.0.1:5500/");
}

#[test]
fn replay_goto_malformed_fragment_falls_back_home() {
    let entries = fixture_arg();
    let result = common::run_cli_case(
        "replay_goto_malformed_fragment_falls_back_home",
        &["--json", "replay", "--entries", &entries, "click:2", "goto:foobar"],
    );
    assert!(result.status.success(), "log: {}", result.log_path.display());
    let lines = common::json_lines(&result.stdout);
    let last = &lines[2]["view"];
    assert_eq!(last["header"], "Journal Entries");
    assert_eq!(last["fragment"], "foobar");
    assert_eq!(last["fallbacks"], 1);
}

#[test]
fn replay_click_outside_list_is_a_user_error() {
    let entries = fixture_arg();
    let result = common::run_cli_case(
        "replay_click_outside_list_is_a_user_error",
        &["--json", "replay", "--entries", &entries, "settings", "click:0"],
    );
    assert_eq!(result.status.code(), Some(1), "log: {}", result.log_path.display());
    assert!(result.stderr.contains("click:0"));
}

#[test]
fn replay_without_entries_file_fails() {
    let result = common::run_cli_case("replay_without_entries_file_fails", &["replay", "back"]);
    assert_eq!(result.status.code(), Some(1));
    assert!(result.stderr.contains("--entries"));
}

#[test]
fn replay_reads_entries_file_from_env() {
    let entries = fixture_arg();
    let result = common::run_cli_case_with_env(
        "replay_reads_entries_file_from_env",
        &["replay", "--initial", "#entry10"],
        &[("JNAV_ENTRIES_FILE", entries.as_str()), ("JNAV_OUTPUT_FORMAT", "json")],
    );
    assert!(result.status.success(), "log: {}", result.log_path.display());
    let lines = common::json_lines(&result.stdout);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["view"]["header"], "Entry 10");
    assert_eq!(lines[0]["view"]["depth"], 1);
}

#[test]
fn parse_reports_route_and_projection() {
    let result = common::run_cli_case("parse_reports_route", &["--json", "parse", "#entry12"]);
    assert!(result.status.success(), "log: {}", result.log_path.display());
    let payload: Value = serde_json::from_str(result.stdout.trim()).unwrap();
    assert_eq!(payload["valid"], true);
    assert_eq!(payload["route"]["view"], "entry");
    assert_eq!(payload["route"]["index"], 12);
    assert_eq!(payload["canonical"], "entry12");
    assert_eq!(payload["header"], "Entry 12");
    assert_eq!(payload["body_class"], "single-entry");
}

#[test]
fn parse_rejects_leading_zero() {
    let result = common::run_cli_case("parse_rejects_leading_zero", &["--json", "parse", "entry01"]);
    assert_eq!(result.status.code(), Some(1));
    let payload: Value = serde_json::from_str(result.stdout.trim()).unwrap();
    assert_eq!(payload["valid"], false);
    assert_eq!(payload["error_code"], "JNAV-2002");
    assert_eq!(payload["fallback"]["view"], "home");
}

#[test]
fn entries_lists_fixture() {
    let entries = fixture_arg();
    let result = common::run_cli_case(
        "entries_lists_fixture",
        &["--json", "entries", "--entries", &entries],
    );
    assert!(result.status.success(), "log: {}", result.log_path.display());
    let payload: Value = serde_json::from_str(result.stdout.trim()).unwrap();
    assert_eq!(payload["count"], 10);
    assert_eq!(payload["entries"][2]["fragment"], "entry3");
    assert_eq!(payload["entries"][2]["entry"]["title"], "Ogres are like onions");
}

#[test]
fn entries_human_output_lists_titles() {
    let entries = fixture_arg();
    let result = common::run_cli_case_with_env(
        "entries_human_output_lists_titles",
        &["--no-color", "entries", "--entries", &entries],
        &[("JNAV_OUTPUT_FORMAT", "human")],
    );
    assert!(result.status.success(), "log: {}", result.log_path.display());
    assert!(result.stdout.starts_with("10 entries"));
    assert!(result.stdout.contains("Run, Forrest! Run!"));
}

#[test]
fn config_validate_accepts_defaults() {
    let result = common::run_cli_case("config_validate_accepts_defaults", &["--json", "config", "validate"]);
    assert!(result.status.success(), "log: {}", result.log_path.display());
    let payload: Value = serde_json::from_str(result.stdout.trim()).unwrap();
    assert_eq!(payload["valid"], true);
    assert_eq!(payload["hash"].as_str().map(str::len), Some(16));
}

#[test]
fn config_validate_rejects_bad_origin() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[history]\norigin = \"ftp://journal\"\n").unwrap();
    let path_arg = path.to_string_lossy().into_owned();
    let result = common::run_cli_case(
        "config_validate_rejects_bad_origin",
        &["--json", "--config", &path_arg, "config", "validate"],
    );
    assert_eq!(result.status.code(), Some(1));
    let payload: Value = serde_json::from_str(result.stdout.trim()).unwrap();
    assert_eq!(payload["valid"], false);
    assert_eq!(payload["error_code"], "JNAV-1001");
}

#[test]
fn explicit_missing_config_is_reported() {
    let result = common::run_cli_case(
        "explicit_missing_config_is_reported",
        &["--config", "/nonexistent/jnav.toml", "entries"],
    );
    assert_eq!(result.status.code(), Some(1));
    assert!(result.stderr.contains("JNAV-1002"));
}

#[test]
fn completions_generate_for_bash() {
    let result = common::run_cli_case("completions_generate_for_bash", &["completions", "bash"]);
    assert!(result.status.success(), "log: {}", result.log_path.display());
    assert!(result.stdout.contains("jnav"));
}
