//! Constants used throughout cellar.
//!
//! Centralizes magic strings and configuration values.

/// The tool's own reference scheme.
pub const SCHEME: &str = "cellar://";

/// Bucket-style scheme accepted on the command line.
pub const GCS_SCHEME: &str = "gs://";

/// Exit code when the secret store was reached and failed.
pub const BACKEND_EXIT_CODE: i32 = 60;

/// Exit code when the caller did something wrong, such as misusing a flag.
pub const MISUSE_EXIT_CODE: i32 = 61;

/// Per-user directory relative to HOME (~/.cellar).
pub const HOME_DIR: &str = ".cellar";

/// Store root inside the per-user directory.
pub const STORE_DIR: &str = "store";

/// Identity file inside the per-user directory.
pub const IDENTITY_FILE: &str = "identity";

/// Optional configuration file inside the per-user directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Collection metadata file name.
pub const COLLECTION_FILE: &str = "collection.toml";

/// Suffix of every secret record file.
pub const SECRET_SUFFIX: &str = ".secret.toml";

/// Generations kept per secret unless the collection says otherwise.
pub const DEFAULT_RETAIN: usize = 10;

/// Environment variable naming a dotenv file declared by the runtime platform.
pub const RUNTIME_ENV_FILE_VAR: &str = "CELLAR_RUNTIME_ENV_FILE";

/// Environment variable overriding the configuration file location.
pub const CONFIG_VAR: &str = "CELLAR_CONFIG";

/// Environment variable holding a tracing filter directive.
pub const LOG_VAR: &str = "CELLAR_LOG";

/// Prefix for temporary files holding plaintext.
pub const TEMPFILE_PREFIX: &str = "cellar-";
