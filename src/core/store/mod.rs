//! Secret store capability.
//!
//! The orchestration core only needs three things from a store: resolve a
//! reference, recognize one, and detect the runtime environment. Those live
//! on the [`SecretStore`] trait so the core can run against a fake.
//!
//! [`LocalStore`] is the concrete store: one directory per collection, one
//! TOML record per secret, payloads age-encrypted.
//!
//! ## Layout
//!
//! ```text
//! <root>/
//! └── <collection>/
//!     ├── collection.toml
//!     └── <name>.secret.toml     # name may contain '/', mapped to sub-directories
//! ```

pub(crate) mod fs;
mod local;
mod record;

use chrono::{DateTime, Utc};
use zeroize::Zeroizing;

use crate::core::context::Context;
use crate::core::runtime::RuntimeEnvironment;
use crate::error::{InputError, Result};

pub use local::LocalStore;
pub use record::{CollectionRecord, SecretRecord, VersionRecord};

/// The narrow capability consumed by environment resolution.
pub trait SecretStore {
    /// Resolve an env reference into plaintext (or, for references with a
    /// destination, into the path the plaintext was written to).
    fn resolve(&self, ctx: &Context, reference: &str) -> Result<Zeroizing<Vec<u8>>>;

    /// Whether a value is a reference this store can resolve.
    fn is_reference(&self, value: &str) -> bool;

    /// Detect the runtime environment the process is running in.
    fn detect_runtime_environment(&self) -> Result<Box<dyn RuntimeEnvironment>>;

    /// Remove what earlier `resolve` calls delivered outside the
    /// environment, such as temporary files. Called when a resolution is
    /// abandoned.
    fn rollback(&self) {}
}

/// A decrypted secret.
#[derive(Debug)]
pub struct Secret {
    pub collection: String,
    pub name: String,
    pub generation: i64,
    pub metageneration: i64,
    pub updated_at: DateTime<Utc>,
    pub plaintext: Zeroizing<Vec<u8>>,
}

/// Listing entry; never carries plaintext.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SecretInfo {
    pub name: String,
    pub generation: i64,
    pub updated_at: DateTime<Utc>,
}

/// A named age recipient.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Member {
    pub label: String,
    pub key: Option<String>,
}

impl Member {
    /// Parse `label=age1…` or a bare `label`.
    ///
    /// # Errors
    ///
    /// Returns `InputError::InvalidMember` for an empty label or a key that
    /// is not an age public key.
    pub fn parse(s: &str) -> std::result::Result<Self, InputError> {
        let invalid = |reason: &str| InputError::InvalidMember {
            member: s.to_string(),
            reason: reason.to_string(),
        };

        let (label, key) = match s.split_once('=') {
            Some((label, key)) => (label.trim(), Some(key.trim())),
            None => (s.trim(), None),
        };

        if label.is_empty() {
            return Err(invalid("missing label"));
        }

        let key = match key {
            Some(key) => {
                crate::core::cipher::parse_recipient(key)
                    .map_err(|_| invalid("not an age public key"))?;
                Some(key.to_string())
            }
            None => None,
        };

        Ok(Self {
            label: label.to_string(),
            key,
        })
    }
}

impl std::fmt::Display for Member {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{} ({})", self.label, key),
            None => write!(f, "{}", self.label),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BootstrapRequest {
    pub collection: String,
    pub label: String,
    pub retain: usize,
}

/// What bootstrap created.
#[derive(Debug, Clone)]
pub struct Bootstrapped {
    pub collection: String,
    pub public_key: String,
    pub identity_created: bool,
}

#[derive(Debug, Clone)]
pub struct AccessRequest {
    pub collection: String,
    pub name: String,
    pub generation: Option<i64>,
}

#[derive(Debug)]
pub struct CreateRequest {
    pub collection: String,
    pub name: String,
    pub plaintext: Zeroizing<Vec<u8>>,
}

#[derive(Debug, Clone)]
pub struct ReadRequest {
    pub collection: String,
    pub name: String,
    pub generation: Option<i64>,
}

#[derive(Debug)]
pub struct UpdateRequest {
    pub collection: String,
    pub name: String,
    /// `None` re-encrypts the current plaintext.
    pub plaintext: Option<Zeroizing<Vec<u8>>>,
    pub create_if_missing: bool,
    /// Fail unless the latest generation still matches.
    pub generation: Option<i64>,
    /// Fail unless the metageneration still matches.
    pub metageneration: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct DeleteRequest {
    pub collection: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct ListRequest {
    pub collection: String,
    pub prefix: Option<String>,
    pub generations: bool,
}

#[derive(Debug, Clone)]
pub struct GrantRequest {
    pub collection: String,
    pub name: String,
    pub members: Vec<Member>,
}

#[derive(Debug, Clone)]
pub struct RevokeRequest {
    pub collection: String,
    pub name: String,
    pub members: Vec<Member>,
}
