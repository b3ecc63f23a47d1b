//! Settings.
//!
//! Built once at startup and passed explicitly to everything that needs it.
//! Precedence: command-line flag, then environment variable (both handled by
//! clap), then the optional config file, then defaults under `~/.cellar`.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::core::constants;
use crate::error::{ConfigError, Result};

/// Values supplied on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub root: Option<PathBuf>,
    pub identity: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

/// Optional `~/.cellar/config.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    root: Option<PathBuf>,
    identity: Option<PathBuf>,
    editor: Option<String>,
}

/// Resolved settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory holding one sub-directory per collection.
    pub root: PathBuf,
    /// age identity used to decrypt.
    pub identity: PathBuf,
    /// Preferred editor for `edit`, before VISUAL/EDITOR.
    pub editor: Option<String>,
}

impl Settings {
    /// Resolve settings from overrides, config file and defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the home directory cannot be determined or
    /// an existing config file cannot be read or parsed.
    pub fn load(overrides: Overrides) -> Result<Self> {
        let home = home_dir()?;
        let config_path = overrides
            .config
            .clone()
            .unwrap_or_else(|| home.join(constants::CONFIG_FILE));
        let file = FileConfig::load(&config_path)?;

        let settings = Self {
            root: overrides
                .root
                .or(file.root)
                .unwrap_or_else(|| home.join(constants::STORE_DIR)),
            identity: overrides
                .identity
                .or(file.identity)
                .unwrap_or_else(|| home.join(constants::IDENTITY_FILE)),
            editor: file.editor,
        };

        debug!(
            root = %settings.root.display(),
            identity = %settings.identity.display(),
            "settings resolved"
        );

        Ok(settings)
    }
}

impl FileConfig {
    fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        debug!(path = %path.display(), "loading config file");
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| {
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
            .into()
        })
    }
}

/// Per-user directory (`~/.cellar`).
pub fn home_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
    Ok(home.join(constants::HOME_DIR))
}
