//! Error types.
//!
//! Every error knows which side of the line it falls on: a local misuse
//! (bad arguments, bad files, unsupported context) or a failure reported
//! by the secret store. The exit taxonomy in [`crate::core::exit`] maps
//! that classification onto process exit codes.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Reference(#[from] ReferenceError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("operation cancelled")]
    Cancelled,
}

/// Where an error originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Local validation failed before the store was involved.
    Misuse,
    /// The store was reached and reported a failure.
    Backend,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Reference(_)
            | Error::Input(_)
            | Error::Config(_)
            | Error::Runtime(_)
            | Error::Process(_) => ErrorKind::Misuse,
            Error::Store(_) | Error::Cancelled => ErrorKind::Backend,
        }
    }
}

/// Secret reference grammar errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("secret does not match format gs://<collection>/<name> or cellar://<collection>/<name>: {0}")]
    InvalidLocator(String),

    #[error("not a secret reference (expected cellar://<collection>/<name>): {0}")]
    NotAReference(String),

    #[error("invalid generation {generation:?} in reference {reference}")]
    InvalidGeneration { reference: String, generation: String },

    #[error("unknown parameter {key:?} in reference {reference} (supported: destination)")]
    UnknownParameter { reference: String, key: String },

    #[error("empty destination in reference {0}")]
    EmptyDestination(String),
}

/// Secret data input errors.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read from stdin: {0}")]
    ReadStdin(#[source] std::io::Error),

    #[error("failed to prepare temporary file for secret: {0}")]
    TempFile(#[source] std::io::Error),

    #[error("secret is empty")]
    EmptySecret,

    #[error("secret unchanged - not going to update")]
    Unchanged,

    #[error("invalid member {member:?}: {reason}")]
    InvalidMember { member: String, reason: String },

    #[error("failed to write output: {0}")]
    Output(#[source] std::io::Error),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unable to determine home directory")]
    NoHomeDir,

    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("no editor is set - set VISUAL or EDITOR")]
    NoEditor,

    #[error("editor {0:?} could not be parsed: {1}")]
    InvalidEditor(String, String),

    #[error("editor {0:?} not found in PATH")]
    EditorNotFound(String),

    #[error("no command specified")]
    NoCommand,
}

/// Runtime environment detection errors.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("failed to detect runtime environment: set CELLAR_RUNTIME_ENV_FILE or use --local")]
    Undetected,

    #[error("failed to find environment variables in {path}: {source}")]
    ReadVars {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Secret store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("collection not found: {0}")]
    CollectionNotFound(String),

    #[error("collection already exists: {0}")]
    CollectionExists(String),

    #[error("invalid collection name {0:?}")]
    InvalidCollection(String),

    #[error("invalid secret name {0:?}")]
    InvalidName(String),

    #[error("secret not found: {collection}/{name}")]
    SecretNotFound { collection: String, name: String },

    #[error("secret already exists: {collection}/{name}")]
    SecretExists { collection: String, name: String },

    #[error("generation {generation} of {name} not found")]
    GenerationNotFound { name: String, generation: i64 },

    #[error("secret {name} was modified concurrently (expected {field} {expected}, found {actual})")]
    PreconditionFailed {
        name: String,
        field: &'static str,
        expected: i64,
        actual: i64,
    },

    #[error("secret {0} has no recipients")]
    NoRecipients(String),

    #[error("invalid recipient key: {0}")]
    InvalidRecipient(String),

    #[error("no identity found at {0}")]
    NoIdentity(PathBuf),

    #[error("invalid identity in {path}: {reason}")]
    InvalidIdentity { path: PathBuf, reason: String },

    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize record: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("failed to resolve {key}: {source}")]
    Resolve {
        key: String,
        #[source]
        source: Box<Error>,
    },
}

/// Child process errors.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("failed to start {label} {program:?}: {source}")]
    Spawn {
        label: String,
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown failure in running {label}: {source}")]
    Wait {
        label: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{label} terminated abnormally: {status}")]
    Abnormal { label: String, status: String },

    #[error("failed to subscribe to signals: {0}")]
    Signals(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
