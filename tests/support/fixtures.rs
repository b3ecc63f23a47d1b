//! Test fixtures and constants.

/// Collection used by most tests.
pub const COLLECTION: &str = "team";

/// A valid age public key for grant tests.
pub const BOB_PUBLIC_KEY: &str = "age1ql3z7hjy54pw3hyww5ayyfg7zqgvc7w3j2elw8zmrj2kg5sfn9aqmcac8p";

/// An invalid public key for negative tests.
pub const INVALID_PUBLIC_KEY: &str = "not-a-valid-age-key";

/// Secrets used across multiple tests.
pub const STANDARD_SECRETS: &[(&str, &str)] = &[
    ("database-url", "postgres://localhost/mydb"),
    ("api/key", "sk-test-12345"),
    ("api/jwt", "super-secret-jwt-token"),
];
