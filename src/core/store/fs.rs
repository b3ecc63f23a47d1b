//! Filesystem helpers for the local store.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;

/// Atomically write `contents` to `path` with owner-only permissions.
///
/// The data lands in a temporary file next to `path` and is renamed into
/// place, so readers never observe a half-written record.
pub fn write_private(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    let write_err = |source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(write_err)?;

    // NamedTempFile is created 0600 on unix.
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(contents).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    Ok(())
}

/// Read and deserialize a TOML file.
pub fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let contents = fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize and atomically write a TOML file.
pub fn write_toml<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let contents = toml::to_string_pretty(value)?;
    write_private(path, contents.as_bytes())
}

/// Remove empty directories from `start` up to, but excluding, `stop`.
pub fn prune_empty_dirs(start: &Path, stop: &Path) {
    let mut current = Some(start);
    while let Some(dir) = current {
        if dir == stop || !dir.starts_with(stop) {
            break;
        }
        // Fails on non-empty directories, which ends the walk.
        if fs::remove_dir(dir).is_err() {
            break;
        }
        current = dir.parent();
    }
}
