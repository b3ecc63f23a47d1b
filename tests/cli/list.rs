//! Tests for `cellar list`.

use crate::support::*;

#[test]
fn test_list_table() {
    let t = Test::with_secrets(COLLECTION, STANDARD_SECRETS);

    let output = t.list(COLLECTION);
    assert_success(&output);

    let out = stdout(&output);
    let lines: Vec<&str> = out.lines().collect();
    assert!(lines[0].starts_with("NAME"));
    assert!(lines[0].contains("GENERATION"));
    assert!(lines[0].contains("UPDATED"));
    let names: Vec<&str> = lines[1..]
        .iter()
        .map(|l| l.split_whitespace().next().unwrap())
        .collect();
    assert_eq!(names, ["api/jwt", "api/key", "database-url"]);
}

#[test]
fn test_list_accepts_scheme_prefix() {
    let t = Test::with_secrets(COLLECTION, STANDARD_SECRETS);

    assert_stdout_contains(&t.list("gs://team"), "database-url");
    assert_stdout_contains(&t.list("cellar://team"), "database-url");
}

#[test]
fn test_list_prefix() {
    let t = Test::with_secrets(COLLECTION, STANDARD_SECRETS);

    let output = t
        .cmd()
        .args(["list", COLLECTION, "--prefix", "api/"])
        .output()
        .unwrap();
    assert_success(&output);
    let out = stdout(&output);
    assert!(out.contains("api/key"));
    assert!(!out.contains("database-url"));
}

#[test]
fn test_list_json_all_generations() {
    let t = Test::with_secrets(COLLECTION, STANDARD_SECRETS);
    assert_success(&t.update("team/api/key", "rotated"));

    let output = t
        .cmd()
        .args(["list", COLLECTION, "--json", "--all-generations", "--prefix", "api/key"])
        .output()
        .unwrap();
    assert_success(&output);

    let entries: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["name"], "api/key");
    assert_eq!(entries[0]["generation"], 1);
    assert_eq!(entries[1]["generation"], 2);
}

#[test]
fn test_list_never_prints_plaintext() {
    let t = Test::with_secrets(COLLECTION, STANDARD_SECRETS);

    let output = t.list_json(COLLECTION);
    assert_success(&output);
    assert!(!stdout(&output).contains("sk-test-12345"));
}

#[test]
fn test_list_missing_collection() {
    let t = Test::bootstrapped(COLLECTION);

    let output = t.list("nope");
    assert_code(&output, BACKEND);
    assert_stderr_contains(&output, "collection not found");
}
