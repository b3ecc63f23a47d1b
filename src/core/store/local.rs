//! Filesystem-backed secret store.

use std::cell::{OnceCell, RefCell};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info, warn};
use walkdir::WalkDir;
use zeroize::Zeroizing;

use super::fs::{prune_empty_dirs, read_toml, write_private, write_toml};
use super::record::{CollectionRecord, SecretRecord};
use super::{
    AccessRequest, BootstrapRequest, Bootstrapped, CreateRequest, DeleteRequest, GrantRequest,
    ListRequest, ReadRequest, RevokeRequest, Secret, SecretInfo, SecretStore, UpdateRequest,
};
use crate::core::cipher;
use crate::core::config::Settings;
use crate::core::constants::{COLLECTION_FILE, SECRET_SUFFIX, TEMPFILE_PREFIX};
use crate::core::context::Context;
use crate::core::identity::Identity;
use crate::core::reference::{self, Destination, EnvReference};
use crate::core::runtime::{self, RuntimeEnvironment};
use crate::error::{Result, StoreError};

/// Secrets stored as age-encrypted TOML records under a root directory.
///
/// The identity is loaded on first use, so operations that never decrypt
/// (listing, deleting, exec without references) work without one.
pub struct LocalStore {
    root: PathBuf,
    identity_path: PathBuf,
    identity: OnceCell<Identity>,
    /// Temporary files written by `resolve`.
    delivered: RefCell<Vec<PathBuf>>,
}

impl std::fmt::Debug for LocalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStore")
            .field("root", &self.root)
            .field("identity_path", &self.identity_path)
            .finish()
    }
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>, identity_path: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            identity_path: identity_path.into(),
            identity: OnceCell::new(),
            delivered: RefCell::new(Vec::new()),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.root, &settings.identity)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn identity(&self) -> Result<&Identity> {
        if let Some(identity) = self.identity.get() {
            return Ok(identity);
        }
        let identity = Identity::load(&self.identity_path)?;
        Ok(self.identity.get_or_init(|| identity))
    }

    fn collection_dir(&self, collection: &str) -> Result<PathBuf> {
        validate_collection(collection)?;
        Ok(self.root.join(collection))
    }

    fn secret_path(&self, collection: &str, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        Ok(self
            .collection_dir(collection)?
            .join(format!("{}{}", name, SECRET_SUFFIX)))
    }

    fn load_collection(&self, collection: &str) -> Result<CollectionRecord> {
        let path = self.collection_dir(collection)?.join(COLLECTION_FILE);
        if !path.exists() {
            return Err(StoreError::CollectionNotFound(collection.to_string()).into());
        }
        Ok(read_toml(&path)?)
    }

    fn load_record(&self, collection: &str, name: &str) -> Result<Option<SecretRecord>> {
        let path = self.secret_path(collection, name)?;
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(read_toml(&path)?))
    }

    fn require_record(&self, collection: &str, name: &str) -> Result<SecretRecord> {
        self.load_record(collection, name)?.ok_or_else(|| {
            StoreError::SecretNotFound {
                collection: collection.to_string(),
                name: name.to_string(),
            }
            .into()
        })
    }

    fn save_record(&self, collection: &str, record: &SecretRecord) -> Result<()> {
        let path = self.secret_path(collection, &record.name)?;
        write_toml(&path, record)?;
        debug!(path = %path.display(), generation = record.generation, "record saved");
        Ok(())
    }

    /// Create a collection and make the caller its default recipient.
    ///
    /// Generates the identity if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::CollectionExists` if the collection is already
    /// bootstrapped.
    pub fn bootstrap(&self, ctx: &Context, req: &BootstrapRequest) -> Result<Bootstrapped> {
        ctx.check()?;
        let path = self.collection_dir(&req.collection)?.join(COLLECTION_FILE);
        if path.exists() {
            return Err(StoreError::CollectionExists(req.collection.clone()).into());
        }

        let (identity, identity_created) = Identity::load_or_generate(&self.identity_path)?;
        let public_key = identity.public_key();

        let mut recipients = BTreeMap::new();
        recipients.insert(req.label.clone(), public_key.clone());
        let record = CollectionRecord {
            created_at: Utc::now(),
            retain: req.retain,
            recipients,
        };
        write_toml(&path, &record)?;

        let _ = self.identity.set(identity);
        info!(collection = %req.collection, identity_created, "collection bootstrapped");

        Ok(Bootstrapped {
            collection: req.collection.clone(),
            public_key,
            identity_created,
        })
    }

    /// Decrypt a secret's plaintext.
    pub fn access(&self, ctx: &Context, req: &AccessRequest) -> Result<Zeroizing<Vec<u8>>> {
        let secret = self.read(
            ctx,
            &ReadRequest {
                collection: req.collection.clone(),
                name: req.name.clone(),
                generation: req.generation,
            },
        )?;
        Ok(secret.plaintext)
    }

    /// Read a secret with its metadata.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::SecretNotFound` or `StoreError::GenerationNotFound`
    /// when the secret or generation is absent, and `StoreError::DecryptionFailed`
    /// when the identity is not a recipient.
    pub fn read(&self, ctx: &Context, req: &ReadRequest) -> Result<Secret> {
        ctx.check()?;
        self.load_collection(&req.collection)?;
        let record = self.require_record(&req.collection, &req.name)?;

        let version =
            record
                .version(req.generation)
                .ok_or_else(|| StoreError::GenerationNotFound {
                    name: req.name.clone(),
                    generation: req.generation.unwrap_or(record.generation),
                })?;

        let plaintext = cipher::decrypt(&version.ciphertext, self.identity()?.as_age())?;
        debug!(
            collection = %req.collection,
            name = %req.name,
            generation = version.generation,
            "secret read"
        );

        Ok(Secret {
            collection: req.collection.clone(),
            name: record.name.clone(),
            generation: version.generation,
            metageneration: record.metageneration,
            updated_at: version.created_at,
            plaintext,
        })
    }

    /// Create a new secret at generation 1.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::SecretExists` if it already exists.
    pub fn create(&self, ctx: &Context, req: &CreateRequest) -> Result<SecretInfo> {
        ctx.check()?;
        let collection = self.load_collection(&req.collection)?;
        if self.load_record(&req.collection, &req.name)?.is_some() {
            return Err(StoreError::SecretExists {
                collection: req.collection.clone(),
                name: req.name.clone(),
            }
            .into());
        }
        self.create_record(&req.collection, &req.name, &collection, &req.plaintext)
    }

    fn create_record(
        &self,
        collection_name: &str,
        name: &str,
        collection: &CollectionRecord,
        plaintext: &[u8],
    ) -> Result<SecretInfo> {
        let mut record = SecretRecord {
            name: name.to_string(),
            generation: 0,
            metageneration: 1,
            updated_at: Utc::now(),
            recipients: collection.recipients.clone(),
            versions: Vec::new(),
        };

        let ciphertext = cipher::encrypt(plaintext, &recipients_of(&record)?)?;
        record.push_version(ciphertext, collection.retain);
        self.save_record(collection_name, &record)?;

        Ok(info_of(&record))
    }

    /// Write a new generation of a secret.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::SecretNotFound` if the secret is missing and
    /// `create_if_missing` is not set (or no plaintext was given), and
    /// `StoreError::PreconditionFailed` if a generation or metageneration
    /// precondition no longer holds.
    pub fn update(&self, ctx: &Context, req: &UpdateRequest) -> Result<SecretInfo> {
        ctx.check()?;
        let collection = self.load_collection(&req.collection)?;

        let mut record = match self.load_record(&req.collection, &req.name)? {
            Some(record) => record,
            None => {
                return match (&req.plaintext, req.create_if_missing) {
                    (Some(plaintext), true) => {
                        self.create_record(&req.collection, &req.name, &collection, plaintext)
                    }
                    _ => Err(StoreError::SecretNotFound {
                        collection: req.collection.clone(),
                        name: req.name.clone(),
                    }
                    .into()),
                };
            }
        };

        check_precondition(&record, "generation", req.generation, record.generation)?;
        check_precondition(
            &record,
            "metageneration",
            req.metageneration,
            record.metageneration,
        )?;

        let plaintext = match &req.plaintext {
            Some(plaintext) => plaintext.clone(),
            None => {
                let latest = record.version(None).ok_or_else(|| {
                    StoreError::GenerationNotFound {
                        name: req.name.clone(),
                        generation: record.generation,
                    }
                })?;
                cipher::decrypt(&latest.ciphertext, self.identity()?.as_age())?
            }
        };

        let ciphertext = cipher::encrypt(&plaintext, &recipients_of(&record)?)?;
        record.push_version(ciphertext, collection.retain);
        self.save_record(&req.collection, &record)?;

        Ok(info_of(&record))
    }

    /// Delete a secret. Missing secrets are not an error.
    pub fn delete(&self, ctx: &Context, req: &DeleteRequest) -> Result<()> {
        ctx.check()?;
        self.load_collection(&req.collection)?;
        let path = self.secret_path(&req.collection, &req.name)?;

        if path.exists() {
            std::fs::remove_file(&path).map_err(|source| StoreError::Write {
                path: path.clone(),
                source,
            })?;
            if let Some(parent) = path.parent() {
                prune_empty_dirs(parent, &self.collection_dir(&req.collection)?);
            }
            debug!(path = %path.display(), "secret deleted");
        }

        Ok(())
    }

    /// List secrets in a collection, sorted by name then generation.
    pub fn list(&self, ctx: &Context, req: &ListRequest) -> Result<Vec<SecretInfo>> {
        ctx.check()?;
        self.load_collection(&req.collection)?;
        let dir = self.collection_dir(&req.collection)?;

        let mut secrets = Vec::new();
        for entry in WalkDir::new(&dir).min_depth(1) {
            let entry = entry.map_err(|e| StoreError::Read {
                path: e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.clone()),
                source: e.into(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(name) = secret_name(&dir, entry.path()) else {
                continue;
            };
            if let Some(prefix) = &req.prefix {
                if !name.starts_with(prefix.as_str()) {
                    continue;
                }
            }

            let record: SecretRecord = read_toml(entry.path())?;
            if req.generations {
                secrets.extend(record.versions.iter().map(|v| SecretInfo {
                    name: name.clone(),
                    generation: v.generation,
                    updated_at: v.created_at,
                }));
            } else {
                secrets.push(SecretInfo {
                    name,
                    generation: record.generation,
                    updated_at: record.updated_at,
                });
            }
        }

        secrets.sort_by(|a, b| (&a.name, a.generation).cmp(&(&b.name, b.generation)));
        Ok(secrets)
    }

    /// Add recipients and re-encrypt every retained generation for them.
    pub fn grant(&self, ctx: &Context, req: &GrantRequest) -> Result<()> {
        ctx.check()?;
        self.load_collection(&req.collection)?;
        let mut record = self.require_record(&req.collection, &req.name)?;

        for member in &req.members {
            let key = member
                .key
                .as_ref()
                .ok_or_else(|| StoreError::InvalidRecipient(member.label.clone()))?;
            cipher::parse_recipient(key)?;
            record.recipients.insert(member.label.clone(), key.clone());
        }

        self.reencrypt(&mut record)?;
        record.metageneration += 1;
        self.save_record(&req.collection, &record)?;
        info!(name = %req.name, members = req.members.len(), "access granted");
        Ok(())
    }

    /// Remove recipients and re-encrypt without them.
    ///
    /// Labels that were never granted are ignored.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NoRecipients` if no recipient would remain.
    pub fn revoke(&self, ctx: &Context, req: &RevokeRequest) -> Result<()> {
        ctx.check()?;
        self.load_collection(&req.collection)?;
        let mut record = self.require_record(&req.collection, &req.name)?;

        let before = record.recipients.len();
        for member in &req.members {
            record.recipients.remove(&member.label);
        }
        if record.recipients.len() == before {
            debug!(name = %req.name, "no recipients to revoke");
            return Ok(());
        }

        self.reencrypt(&mut record)?;
        record.metageneration += 1;
        self.save_record(&req.collection, &record)?;
        info!(name = %req.name, members = req.members.len(), "access revoked");
        Ok(())
    }

    fn reencrypt(&self, record: &mut SecretRecord) -> Result<()> {
        let recipients = recipients_of(record)?;
        let identity = self.identity()?;
        for version in &mut record.versions {
            let plaintext = cipher::decrypt(&version.ciphertext, identity.as_age())?;
            version.ciphertext = cipher::encrypt(&plaintext, &recipients)?;
        }
        Ok(())
    }

    fn deliver(&self, destination: &Destination, plaintext: &[u8]) -> Result<PathBuf> {
        match destination {
            Destination::TempFile => {
                let temp_err = |source| StoreError::Write {
                    path: std::env::temp_dir(),
                    source,
                };
                let mut file = tempfile::Builder::new()
                    .prefix(TEMPFILE_PREFIX)
                    .tempfile()
                    .map_err(temp_err)?;
                file.write_all(plaintext).map_err(temp_err)?;
                let (_, path) = file.keep().map_err(|e| temp_err(e.error))?;
                self.delivered.borrow_mut().push(path.clone());
                Ok(path)
            }
            Destination::Path(path) => {
                write_private(path, plaintext)?;
                Ok(path.clone())
            }
        }
    }
}

impl SecretStore for LocalStore {
    fn resolve(&self, ctx: &Context, reference: &str) -> Result<Zeroizing<Vec<u8>>> {
        let parsed = EnvReference::parse(reference)?;
        let plaintext = self.access(
            ctx,
            &AccessRequest {
                collection: parsed.secret.collection().to_string(),
                name: parsed.secret.name().to_string(),
                generation: parsed.secret.generation(),
            },
        )?;

        match &parsed.destination {
            None => Ok(plaintext),
            Some(destination) => {
                let path = self.deliver(destination, &plaintext)?;
                debug!(path = %path.display(), "secret written to destination");
                Ok(Zeroizing::new(path_bytes(&path)))
            }
        }
    }

    fn is_reference(&self, value: &str) -> bool {
        reference::is_reference(value)
    }

    fn detect_runtime_environment(&self) -> Result<Box<dyn RuntimeEnvironment>> {
        runtime::detect_from_env()
    }

    fn rollback(&self) {
        for path in self.delivered.borrow_mut().drain(..) {
            match std::fs::remove_file(&path) {
                Ok(()) => debug!(path = %path.display(), "delivered secret removed"),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "failed to remove delivered secret")
                }
            }
        }
    }
}

fn recipients_of(record: &SecretRecord) -> Result<Vec<age::x25519::Recipient>> {
    if record.recipients.is_empty() {
        return Err(StoreError::NoRecipients(record.name.clone()).into());
    }
    Ok(record
        .recipients
        .values()
        .map(|key| cipher::parse_recipient(key))
        .collect::<std::result::Result<_, _>>()?)
}

fn info_of(record: &SecretRecord) -> SecretInfo {
    SecretInfo {
        name: record.name.clone(),
        generation: record.generation,
        updated_at: record.updated_at,
    }
}

fn check_precondition(
    record: &SecretRecord,
    field: &'static str,
    expected: Option<i64>,
    actual: i64,
) -> Result<()> {
    match expected {
        Some(expected) if expected != actual => Err(StoreError::PreconditionFailed {
            name: record.name.clone(),
            field,
            expected,
            actual,
        }
        .into()),
        _ => Ok(()),
    }
}

fn validate_collection(collection: &str) -> Result<()> {
    let valid = !collection.is_empty()
        && collection != "."
        && collection != ".."
        && !collection.contains(['/', '\\', '\0']);
    if !valid {
        return Err(StoreError::InvalidCollection(collection.to_string()).into());
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<()> {
    let valid = !name.contains(['\\', '\0'])
        && name
            .split('/')
            .all(|part| !part.is_empty() && part != "." && part != "..");
    if !valid {
        return Err(StoreError::InvalidName(name.to_string()).into());
    }
    Ok(())
}

/// Secret name for a record file under `dir`, with `/` separators.
fn secret_name(dir: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(dir).ok()?;
    let parts: Vec<&str> = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<_>>()?;
    let joined = parts.join("/");
    joined
        .strip_suffix(SECRET_SUFFIX)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

#[cfg(unix)]
fn path_bytes(path: &Path) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    path.as_os_str().as_bytes().to_vec()
}

#[cfg(not(unix))]
fn path_bytes(path: &Path) -> Vec<u8> {
    path.to_string_lossy().into_owned().into_bytes()
}
