//! Identity type.
//!
//! Wraps the age private key used to decrypt secrets.

use std::fs;
use std::path::{Path, PathBuf};

use age::x25519;
use tracing::{debug, warn};

use crate::error::StoreError;

/// A private key identity for decrypting secrets
pub struct Identity {
    inner: x25519::Identity,
    path: PathBuf,
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("public_key", &self.public_key())
            .field("path", &self.path)
            .finish()
    }
}

impl Identity {
    /// Load an identity file.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NoIdentity` if the file doesn't exist, or
    /// `StoreError::InvalidIdentity` if it doesn't hold an age secret key.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        debug!(path = %path.display(), "loading identity");

        if !path.exists() {
            return Err(StoreError::NoIdentity(path.to_path_buf()));
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            if let Ok(metadata) = fs::metadata(path) {
                let mode = metadata.permissions().mode() & 0o777;
                if mode & 0o077 != 0 {
                    warn!(
                        path = %path.display(),
                        mode = %format!("{:o}", mode),
                        "insecure identity file permissions"
                    );
                }
            }
        }

        let contents = fs::read_to_string(path).map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let inner: x25519::Identity = contents
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty() && !line.starts_with('#'))
            .unwrap_or_default()
            .parse()
            .map_err(|e: &str| StoreError::InvalidIdentity {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            inner,
            path: path.to_path_buf(),
        })
    }

    /// Generate a new identity and save it with owner-only permissions.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Write` if the file cannot be written.
    pub fn generate(path: &Path) -> Result<Self, StoreError> {
        debug!(path = %path.display(), "generating new identity");

        let inner = x25519::Identity::generate();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        use age::secrecy::ExposeSecret;
        let secret = inner.to_string();
        let contents = format!(
            "# public key: {}\n{}\n",
            inner.to_public(),
            secret.expose_secret()
        );
        super::store::fs::write_private(path, contents.as_bytes())?;

        debug!(path = %path.display(), "identity saved");

        Ok(Self {
            inner,
            path: path.to_path_buf(),
        })
    }

    /// Load the identity, generating it first if absent.
    ///
    /// Returns the identity and whether it was created.
    pub fn load_or_generate(path: &Path) -> Result<(Self, bool), StoreError> {
        if path.exists() {
            Ok((Self::load(path)?, false))
        } else {
            Ok((Self::generate(path)?, true))
        }
    }

    /// Corresponding public key
    pub fn public_key(&self) -> String {
        self.inner.to_public().to_string()
    }

    /// Reference to the inner age identity for decryption
    pub fn as_age(&self) -> &x25519::Identity {
        &self.inner
    }

    /// Key file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}
