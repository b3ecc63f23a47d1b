//! On-disk record types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::constants::DEFAULT_RETAIN;

/// Collection metadata stored in `collection.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionRecord {
    pub created_at: DateTime<Utc>,
    /// Generations kept per secret.
    #[serde(default = "default_retain")]
    pub retain: usize,
    /// Recipients applied to newly created secrets.
    #[serde(default)]
    pub recipients: BTreeMap<String, String>,
}

fn default_retain() -> usize {
    DEFAULT_RETAIN
}

/// One secret, all retained generations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretRecord {
    pub name: String,
    /// Latest generation.
    pub generation: i64,
    /// Bumped on every recipient change.
    pub metageneration: i64,
    pub updated_at: DateTime<Utc>,
    pub recipients: BTreeMap<String, String>,
    /// Oldest first.
    pub versions: Vec<VersionRecord>,
}

/// One encrypted generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionRecord {
    pub generation: i64,
    pub created_at: DateTime<Utc>,
    pub ciphertext: String,
}

impl SecretRecord {
    /// The requested generation, or the latest.
    pub fn version(&self, generation: Option<i64>) -> Option<&VersionRecord> {
        match generation {
            Some(g) => self.versions.iter().find(|v| v.generation == g),
            None => self.versions.last(),
        }
    }

    /// Append a new generation and drop the oldest beyond `retain`.
    pub fn push_version(&mut self, ciphertext: String, retain: usize) -> i64 {
        let now = Utc::now();
        self.generation += 1;
        self.updated_at = now;
        self.versions.push(VersionRecord {
            generation: self.generation,
            created_at: now,
            ciphertext,
        });

        let retain = retain.max(1);
        if self.versions.len() > retain {
            let excess = self.versions.len() - retain;
            self.versions.drain(..excess);
        }

        self.generation
    }
}
