//! Tests for `cellar exec`.

use crate::support::*;

#[test]
fn test_local_resolves_references() {
    let t = Test::with_secrets(COLLECTION, STANDARD_SECRETS);

    let output = t
        .cmd()
        .env("API_KEY", "cellar://team/api/key")
        .env("PLAIN", "gs://team/api/key")
        .args(["exec", "--local", "--", "sh", "-c", r#"printf '%s|%s' "$API_KEY" "$PLAIN""#])
        .output()
        .unwrap();
    assert_success(&output);
    assert_stdout_eq(&output, "sk-test-12345|gs://team/api/key");
}

#[test]
fn test_local_failure_spawns_nothing() {
    let t = Test::with_secrets(COLLECTION, STANDARD_SECRETS);
    let marker = t.dir.path().join("ran");

    let output = t
        .cmd()
        .env("MISSING", "cellar://team/missing")
        .args(["exec", "--local", "--", "touch"])
        .arg(&marker)
        .output()
        .unwrap();
    assert_code(&output, BACKEND);
    assert_stderr_contains(&output, "failed to resolve MISSING");
    assert!(!marker.exists());
}

#[test]
fn test_malformed_reference_is_backend_error() {
    let t = Test::bootstrapped(COLLECTION);

    let output = t
        .cmd()
        .env("BROKEN", "cellar://noslash")
        .args(["exec", "--local", "--", "true"])
        .output()
        .unwrap();
    assert_code(&output, BACKEND);
}

#[test]
fn test_exit_code_passes_through() {
    let t = Test::bootstrapped(COLLECTION);

    let output = t.exec_local("exit 7");
    assert_code(&output, 7);
    assert_stderr_contains(&output, "process exited non-zero");
}

#[test]
fn test_child_killed_by_signal_is_misuse() {
    let t = Test::bootstrapped(COLLECTION);

    let output = t.exec_local("kill -9 $$");
    assert_code(&output, MISUSE);
}

#[test]
fn test_missing_program_is_misuse() {
    let t = Test::bootstrapped(COLLECTION);

    let output = t
        .cmd()
        .args(["exec", "--local", "--", "cellar-no-such-program"])
        .output()
        .unwrap();
    assert_code(&output, MISUSE);
    assert_stderr_contains(&output, "failed to start process");
}

#[test]
fn test_no_command_is_misuse() {
    let t = Test::bootstrapped(COLLECTION);

    let output = t.cmd().args(["exec", "--local"]).output().unwrap();
    assert_code(&output, MISUSE);
    assert_stderr_contains(&output, "no command specified");
}

#[test]
fn test_stdio_is_inherited() {
    let t = Test::bootstrapped(COLLECTION);

    let output = t
        .cmd()
        .args(["exec", "--local", "--", "cat"])
        .write_stdin("through the child")
        .output()
        .unwrap();
    assert_success(&output);
    assert_stdout_eq(&output, "through the child");
}

#[test]
fn test_tempfile_destination() {
    let t = Test::with_secrets(COLLECTION, STANDARD_SECRETS);

    let output = t
        .cmd()
        .env("KEY_FILE", "cellar://team/api/key?destination=tempfile")
        .args(["exec", "--local", "--", "sh", "-c", r#"cat "$KEY_FILE"; rm -f "$KEY_FILE""#])
        .output()
        .unwrap();
    assert_success(&output);
    assert_stdout_eq(&output, "sk-test-12345");
}

#[test]
fn test_pinned_generation() {
    let t = Test::with_secrets(COLLECTION, STANDARD_SECRETS);
    assert_success(&t.update("team/api/key", "rotated"));

    let output = t
        .cmd()
        .env("OLD", "cellar://team/api/key#1")
        .args(["exec", "--local", "--", "sh", "-c", r#"printf %s "$OLD""#])
        .output()
        .unwrap();
    assert_stdout_eq(&output, "sk-test-12345");
}

#[test]
fn test_runtime_without_detection_is_misuse() {
    let t = Test::bootstrapped(COLLECTION);

    let output = t.cmd().args(["exec", "--", "true"]).output().unwrap();
    assert_code(&output, MISUSE);
    assert_stderr_contains(&output, "--local");
}

#[test]
fn test_runtime_appends_declared_references() {
    let t = Test::with_secrets(COLLECTION, STANDARD_SECRETS);
    let env_file = t.write_file(
        "runtime.env",
        "# declared by the platform\nDB=cellar://team/database-url\nPLAIN=value\n",
    );

    let output = t
        .cmd()
        .env("CELLAR_RUNTIME_ENV_FILE", &env_file)
        .env("DB", "inherited")
        .args([
            "exec",
            "--",
            "sh",
            "-c",
            r#"printf '%s|%s' "$DB" "${PLAIN:-unset}""#,
        ])
        .output()
        .unwrap();
    assert_success(&output);
    assert_stdout_eq(&output, "postgres://localhost/mydb|unset");
}

#[test]
fn test_runtime_unreadable_file_is_misuse() {
    let t = Test::bootstrapped(COLLECTION);

    let output = t
        .cmd()
        .env("CELLAR_RUNTIME_ENV_FILE", t.dir.path().join("absent.env"))
        .args(["exec", "--", "true"])
        .output()
        .unwrap();
    assert_code(&output, MISUSE);
}

#[test]
fn test_failed_resolution_removes_delivered_tempfiles() {
    let t = Test::with_secrets(COLLECTION, STANDARD_SECRETS);
    let tmp = t.dir.path().join("tmp");
    std::fs::create_dir(&tmp).unwrap();

    // Resolved in key order: the tempfile is written before the failure.
    let output = t
        .cmd()
        .env("TMPDIR", &tmp)
        .env("A_KEY_FILE", "cellar://team/api/key?destination=tempfile")
        .env("Z_MISSING", "cellar://team/missing")
        .args(["exec", "--local", "--", "true"])
        .output()
        .unwrap();
    assert_code(&output, BACKEND);
    assert_stderr_contains(&output, "failed to resolve Z_MISSING");
    assert_eq!(std::fs::read_dir(&tmp).unwrap().count(), 0);
}
