//! Tests for exit codes, global flags and completions.

use crate::support::*;
use predicates::prelude::*;

#[test]
fn test_help_succeeds() {
    let t = Test::new();

    let output = t.cmd().arg("--help").output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "Usage");
}

#[test]
fn test_version_flag() {
    let t = Test::new();

    let output = t.cmd().arg("--version").output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "cellar");
}

#[test]
fn test_unknown_command_is_misuse() {
    let t = Test::new();

    let output = t.cmd().arg("unknown-command").output().unwrap();
    assert_code(&output, MISUSE);
}

#[test]
fn test_bad_flag_value_is_misuse() {
    let t = Test::new();

    let output = t
        .cmd()
        .args(["--log-level", "loud", "list", "team"])
        .output()
        .unwrap();
    assert_code(&output, MISUSE);
}

#[test]
fn test_debug_logs_go_to_stderr() {
    let t = Test::with_secrets(COLLECTION, STANDARD_SECRETS);

    let output = t
        .cmd()
        .args(["access", "team/api/key", "--log-level", "debug"])
        .output()
        .unwrap();
    assert_success(&output);
    assert_stdout_eq(&output, "sk-test-12345");
    assert_stderr_contains(&output, "secret read");
}

#[test]
fn test_json_log_format() {
    let t = Test::with_secrets(COLLECTION, STANDARD_SECRETS);

    let output = t
        .cmd()
        .args(["-l", "debug", "-f", "json", "access", "team/api/key"])
        .output()
        .unwrap();
    assert_success(&output);
    let first = stderr(&output).lines().next().unwrap_or_default().to_string();
    let parsed: serde_json::Value = serde_json::from_str(&first).unwrap();
    assert!(parsed.get("level").is_some());
}

#[test]
fn test_logs_never_contain_plaintext() {
    let t = Test::with_secrets(COLLECTION, STANDARD_SECRETS);

    let output = t
        .cmd()
        .env("API_KEY", "cellar://team/api/key")
        .args(["-l", "trace", "exec", "--local", "--", "true"])
        .output()
        .unwrap();
    assert_success(&output);
    assert!(!stderr(&output).contains("sk-test-12345"));
}

#[test]
fn test_malformed_config_is_misuse() {
    let t = Test::new();
    let config = t.write_file("config.toml", "root = [not toml");

    let output = t
        .cmd()
        .env("CELLAR_CONFIG", &config)
        .args(["list", "team"])
        .output()
        .unwrap();
    assert_code(&output, MISUSE);
    assert_stderr_contains(&output, "failed to parse config");
}

#[test]
fn test_config_file_sets_root() {
    let t = Test::new();
    let root = t.dir.path().join("configured-root");
    let config = t.write_file(
        "config.toml",
        &format!("root = {:?}\n", root.display().to_string()),
    );

    let output = t
        .cmd()
        .env("CELLAR_CONFIG", &config)
        .args(["bootstrap", "--collection", "team"])
        .output()
        .unwrap();
    assert_success(&output);
    assert!(root.join("team").join("collection.toml").exists());
}

#[test]
fn test_completion_bash() {
    let t = Test::new();

    let output = t.cmd().args(["completion", "bash"]).output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "_cellar");
}

#[test]
fn test_completion_zsh_registers_compdef() {
    let t = Test::new();

    let output = t.cmd().args(["completion", "zsh"]).output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "compdef _cellar cellar");
}

#[test]
fn test_completion_unknown_shell_is_misuse() {
    let t = Test::new();

    let output = t.cmd().args(["completion", "tcsh"]).output().unwrap();
    assert_code(&output, MISUSE);
}

#[test]
fn test_delete_in_missing_collection_is_backend() {
    let t = Test::bootstrapped(COLLECTION);

    t.cmd()
        .args(["delete", "elsewhere/api/key"])
        .assert()
        .code(BACKEND)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("collection not found: elsewhere"));
}

#[test]
fn test_invalid_locator_is_misuse() {
    let t = Test::new();

    t.cmd()
        .args(["access", "noSlash"])
        .assert()
        .code(MISUSE)
        .stderr(predicate::str::contains("gs://<collection>/<name>"));
}
