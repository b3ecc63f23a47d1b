//! Runtime environment detection.
//!
//! A runtime environment is the variable set a hosting platform declares for
//! the workload, separate from what the supervisor process inherited. The
//! only platform contract supported is a dotenv file named by
//! `CELLAR_RUNTIME_ENV_FILE`.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::constants::RUNTIME_ENV_FILE_VAR;
use crate::core::context::Context;
use crate::core::dotenv;
use crate::error::{Result, RuntimeError};

/// A detected runtime that can enumerate its declared variables.
pub trait RuntimeEnvironment {
    /// Short human-readable platform name.
    fn name(&self) -> &str;

    /// Declared variables, in the order the platform reports them.
    fn env_vars(&self, ctx: &Context) -> Result<Vec<(String, String)>>;
}

/// Variables declared in a dotenv file.
#[derive(Debug, Clone)]
pub struct DotenvRuntime {
    path: PathBuf,
}

impl DotenvRuntime {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RuntimeEnvironment for DotenvRuntime {
    fn name(&self) -> &str {
        "dotenv"
    }

    fn env_vars(&self, ctx: &Context) -> Result<Vec<(String, String)>> {
        ctx.check()?;
        let vars = dotenv::load(&self.path).map_err(|source| RuntimeError::ReadVars {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), count = vars.len(), "runtime variables loaded");
        Ok(vars)
    }
}

/// Detect the runtime from a variable lookup.
///
/// # Errors
///
/// Returns `RuntimeError::Undetected` when no supported platform contract is
/// present.
pub fn detect<F>(lookup: F) -> Result<Box<dyn RuntimeEnvironment>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(RUNTIME_ENV_FILE_VAR) {
        Some(path) if !path.is_empty() => {
            debug!(path = %path, "detected dotenv runtime");
            Ok(Box::new(DotenvRuntime::new(path)))
        }
        _ => Err(RuntimeError::Undetected.into()),
    }
}

/// Detect the runtime from the process environment.
pub fn detect_from_env() -> Result<Box<dyn RuntimeEnvironment>> {
    detect(|key| std::env::var(key).ok())
}
