//! Secret reference grammar.
//!
//! Two shapes are understood:
//!
//! - **Locators**, given on the command line: `[gs://|cellar://]<collection>/<name>`.
//! - **Env references**, found in environment variable values:
//!   `cellar://<collection>/<name>[?destination=<tempfile|path>][#<generation>]`.
//!
//! In both shapes the split happens at the first `/`; everything after it is
//! the secret name, verbatim.

use std::fmt;
use std::path::PathBuf;

use crate::core::constants::{GCS_SCHEME, SCHEME};
use crate::error::ReferenceError;

/// A pointer to a secret in a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretReference {
    collection: String,
    name: String,
    generation: Option<i64>,
}

impl SecretReference {
    /// Build a reference from already-validated parts.
    pub fn new(collection: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            name: name.into(),
            generation: None,
        }
    }

    /// Pin this reference to a specific generation.
    pub fn with_generation(mut self, generation: i64) -> Self {
        self.generation = Some(generation);
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn generation(&self) -> Option<i64> {
        self.generation
    }
}

impl fmt::Display for SecretReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}/{}", SCHEME, self.collection, self.name)?;
        if let Some(generation) = self.generation {
            write!(f, "#{}", generation)?;
        }
        Ok(())
    }
}

/// Parse a command-line locator into a reference.
///
/// A `gs://` or `cellar://` prefix is stripped when present. No trimming,
/// case folding, or existence check happens here.
///
/// # Errors
///
/// Returns `ReferenceError::InvalidLocator` if there is no `/`, or if
/// either side of it is empty.
pub fn parse_locator(locator: &str) -> Result<SecretReference, ReferenceError> {
    let stripped = strip_scheme(locator);

    match stripped.split_once('/') {
        Some((collection, name)) if !collection.is_empty() && !name.is_empty() => {
            Ok(SecretReference::new(collection, name))
        }
        _ => Err(ReferenceError::InvalidLocator(stripped.to_string())),
    }
}

/// Strip a recognized scheme prefix, if any.
pub fn strip_scheme(s: &str) -> &str {
    let s = s.strip_prefix(GCS_SCHEME).unwrap_or(s);
    s.strip_prefix(SCHEME).unwrap_or(s)
}

/// Whether an environment value should be resolved.
pub fn is_reference(value: &str) -> bool {
    value.starts_with(SCHEME)
}

/// Where a resolved env reference should be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// A fresh private temporary file; the variable receives its path.
    TempFile,
    /// A caller-chosen path; the variable receives this path.
    Path(PathBuf),
}

/// A reference as it appears inside an environment variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvReference {
    pub secret: SecretReference,
    pub destination: Option<Destination>,
}

impl EnvReference {
    /// Parse an environment value.
    ///
    /// # Errors
    ///
    /// Returns `ReferenceError` if the value lacks the `cellar://` scheme,
    /// has no `<collection>/<name>`, carries a non-numeric generation, or
    /// uses an unknown parameter.
    pub fn parse(value: &str) -> Result<Self, ReferenceError> {
        let rest = value
            .strip_prefix(SCHEME)
            .ok_or_else(|| ReferenceError::NotAReference(value.to_string()))?;

        let (rest, generation) = match rest.rsplit_once('#') {
            Some((rest, raw)) => {
                let generation = raw.parse::<i64>().map_err(|_| ReferenceError::InvalidGeneration {
                    reference: value.to_string(),
                    generation: raw.to_string(),
                })?;
                (rest, Some(generation))
            }
            None => (rest, None),
        };

        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (rest, None),
        };

        let mut secret = match path.split_once('/') {
            Some((collection, name)) if !collection.is_empty() && !name.is_empty() => {
                SecretReference::new(collection, name)
            }
            _ => return Err(ReferenceError::InvalidLocator(path.to_string())),
        };
        secret.generation = generation;

        let mut destination = None;
        for pair in query.into_iter().flat_map(|q| q.split('&')) {
            if pair.is_empty() {
                continue;
            }
            let (key, val) = pair.split_once('=').unwrap_or((pair, ""));
            match key {
                "destination" => {
                    destination = Some(match val {
                        "" => return Err(ReferenceError::EmptyDestination(value.to_string())),
                        "tempfile" | "tmpfile" => Destination::TempFile,
                        path => Destination::Path(PathBuf::from(path)),
                    });
                }
                other => {
                    return Err(ReferenceError::UnknownParameter {
                        reference: value.to_string(),
                        key: other.to_string(),
                    })
                }
            }
        }

        Ok(Self {
            secret,
            destination,
        })
    }
}
