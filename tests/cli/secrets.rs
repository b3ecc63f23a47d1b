//! Tests for create, access, update and delete.

use crate::support::*;

#[test]
fn test_create_and_access_roundtrip() {
    let t = Test::bootstrapped(COLLECTION);
    assert_roundtrip(&t, "team/api/key", "sk-test-12345");
}

#[test]
fn test_access_accepts_both_schemes() {
    let t = Test::with_secrets(COLLECTION, STANDARD_SECRETS);

    assert_stdout_eq(&t.access("gs://team/api/key"), "sk-test-12345");
    assert_stdout_eq(&t.access("cellar://team/api/key"), "sk-test-12345");
}

#[test]
fn test_create_existing_is_backend_error() {
    let t = Test::with_secrets(COLLECTION, STANDARD_SECRETS);

    let output = t.create("team/api/key", "again");
    assert_code(&output, BACKEND);
    assert_stderr_contains(&output, "secret already exists");
}

#[test]
fn test_create_from_file() {
    let t = Test::bootstrapped(COLLECTION);
    let path = t.write_file("cert.pem", "-----BEGIN-----\nabc\n");

    assert_success(&t.create("team/cert", &format!("@{}", path.display())));
    assert_stdout_eq(&t.access("team/cert"), "-----BEGIN-----\nabc\n");
}

#[test]
fn test_create_from_stdin_reads_one_line() {
    let t = Test::bootstrapped(COLLECTION);

    let output = t
        .cmd()
        .args(["create", "team/piped", "-"])
        .write_stdin("first\nsecond\n")
        .output()
        .unwrap();
    assert_success(&output);
    assert_stdout_eq(&t.access("team/piped"), "first\n");
}

#[test]
fn test_escaped_literal() {
    let t = Test::bootstrapped(COLLECTION);

    assert_success(&t.create("team/at", "\\@literal"));
    assert_stdout_eq(&t.access("team/at"), "@literal");
}

#[test]
fn test_missing_data_file_is_misuse() {
    let t = Test::bootstrapped(COLLECTION);

    let output = t.create("team/x", "@does-not-exist");
    assert_code(&output, MISUSE);
    assert_stderr_contains(&output, "does-not-exist");
}

#[test]
fn test_invalid_locator_is_misuse() {
    let t = Test::bootstrapped(COLLECTION);

    let output = t.access("noSlash");
    assert_code(&output, MISUSE);
    assert_stderr_contains(&output, "gs://<collection>/<name>");
}

#[test]
fn test_update_creates_generations() {
    let t = Test::with_secrets(COLLECTION, STANDARD_SECRETS);

    let output = t.update("team/api/key", "rotated");
    assert_success(&output);
    assert_stderr_contains(&output, "generation 2");

    assert_stdout_eq(&t.access("team/api/key"), "rotated");
    let output = t
        .cmd()
        .args(["access", "team/api/key", "--generation", "1"])
        .output()
        .unwrap();
    assert_stdout_eq(&output, "sk-test-12345");
}

#[test]
fn test_update_without_data_keeps_value() {
    let t = Test::with_secrets(COLLECTION, STANDARD_SECRETS);

    let output = t.cmd().args(["update", "team/api/key"]).output().unwrap();
    assert_success(&output);
    assert_stdout_eq(&t.access("team/api/key"), "sk-test-12345");
}

#[test]
fn test_update_missing_secret() {
    let t = Test::bootstrapped(COLLECTION);

    assert_code(&t.update("team/new", "value"), BACKEND);

    let output = t
        .cmd()
        .args(["update", "team/new", "value", "--create-if-missing"])
        .output()
        .unwrap();
    assert_success(&output);
    assert_stdout_eq(&t.access("team/new"), "value");
}

#[test]
fn test_delete_is_idempotent() {
    let t = Test::with_secrets(COLLECTION, STANDARD_SECRETS);

    assert_success(&t.delete("team/api/key"));
    assert_success(&t.delete("team/api/key"));
    assert_code(&t.access("team/api/key"), BACKEND);
    assert_stdout_eq(&t.access("team/api/jwt"), "super-secret-jwt-token");
}

#[test]
fn test_access_before_bootstrap_hints() {
    let t = Test::new();

    let output = t.access("team/api/key");
    assert_code(&output, BACKEND);
    assert_stderr_contains(&output, "cellar bootstrap");
}

#[test]
fn test_access_missing_generation() {
    let t = Test::with_secrets(COLLECTION, STANDARD_SECRETS);

    let output = t
        .cmd()
        .args(["access", "team/api/key", "--generation", "9"])
        .output()
        .unwrap();
    assert_code(&output, BACKEND);
    assert_stderr_contains(&output, "generation 9");
}
