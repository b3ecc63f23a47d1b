//! Environment resolution.
//!
//! Builds the environment handed to a supervised child by replacing secret
//! references with their plaintext. Two modes exist:
//!
//! - **Local**: references in the current process environment are replaced
//!   in place.
//! - **Runtime**: the hosting platform declares the workload's variables;
//!   references among them are resolved and appended to the current
//!   environment.
//!
//! Resolution is sequential and fail-fast: the first failure discards
//! everything resolved so far.

use std::ffi::{OsStr, OsString};

use tracing::debug;
use zeroize::Zeroizing;

use crate::core::context::Context;
use crate::core::store::SecretStore;
use crate::error::{Error, Result, StoreError};

/// An ordered set of environment entries.
///
/// Keys may repeat; the last occurrence wins when the environment is
/// applied to a child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    entries: Vec<(OsString, OsString)>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current process environment.
    pub fn current() -> Self {
        Self {
            entries: std::env::vars_os().collect(),
        }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn push(&mut self, key: impl Into<OsString>, value: impl Into<OsString>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Effective value of `key`.
    pub fn get(&self, key: impl AsRef<OsStr>) -> Option<&OsStr> {
        let key = key.as_ref();
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_os_str())
    }

    pub fn entries(&self) -> &[(OsString, OsString)] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OsStr, &OsStr)> {
        self.entries.iter().map(|(k, v)| (k.as_os_str(), v.as_os_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Where references are looked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// The current process environment.
    Local,
    /// The variables declared by the detected runtime.
    #[default]
    Runtime,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResolverConfig {
    pub mode: Mode,
}

/// Resolves secret references against a [`SecretStore`].
pub struct EnvironmentResolver<'a> {
    store: &'a dyn SecretStore,
    config: ResolverConfig,
}

impl<'a> EnvironmentResolver<'a> {
    pub fn new(store: &'a dyn SecretStore, config: ResolverConfig) -> Self {
        Self { store, config }
    }

    /// Resolve references and return the environment for the child.
    ///
    /// `base` is the supervisor's own environment.
    ///
    /// # Errors
    ///
    /// Runtime detection failures keep their own classification. Every
    /// resolution failure is reported as `StoreError::Resolve`. On failure
    /// the store rolls back whatever it already delivered.
    pub fn resolve(&self, ctx: &Context, base: Environment) -> Result<Environment> {
        let result = match self.config.mode {
            Mode::Local => self.resolve_local(ctx, base),
            Mode::Runtime => self.resolve_runtime(ctx, base),
        };
        if result.is_err() {
            self.store.rollback();
        }
        result
    }

    fn resolve_local(&self, ctx: &Context, mut env: Environment) -> Result<Environment> {
        let mut resolved = 0usize;
        for (key, value) in &mut env.entries {
            let Some(reference) = value.to_str().filter(|v| self.store.is_reference(v)) else {
                continue;
            };
            let plaintext = self.resolve_one(ctx, key.as_os_str(), reference)?;
            *value = into_os_string(plaintext);
            resolved += 1;
        }
        debug!(resolved, total = env.len(), "local environment resolved");
        Ok(env)
    }

    fn resolve_runtime(&self, ctx: &Context, mut env: Environment) -> Result<Environment> {
        let runtime = self.store.detect_runtime_environment()?;
        let declared = runtime.env_vars(ctx)?;
        debug!(runtime = runtime.name(), declared = declared.len(), "runtime detected");

        let mut resolved = 0usize;
        for (key, value) in &declared {
            if !self.store.is_reference(value) {
                continue;
            }
            let plaintext = self.resolve_one(ctx, OsStr::new(key), value)?;
            env.push(key, into_os_string(plaintext));
            resolved += 1;
        }
        debug!(resolved, "runtime environment resolved");
        Ok(env)
    }

    fn resolve_one(
        &self,
        ctx: &Context,
        key: &OsStr,
        reference: &str,
    ) -> Result<Zeroizing<Vec<u8>>> {
        let wrap = |source: Error| StoreError::Resolve {
            key: key.to_string_lossy().into_owned(),
            source: Box::new(source),
        };
        ctx.check().map_err(wrap)?;
        debug!(key = %key.to_string_lossy(), "resolving reference");
        Ok(self.store.resolve(ctx, reference).map_err(wrap)?)
    }
}

#[cfg(unix)]
fn into_os_string(plaintext: Zeroizing<Vec<u8>>) -> OsString {
    use std::os::unix::ffi::OsStringExt;
    OsString::from_vec(plaintext.to_vec())
}

#[cfg(not(unix))]
fn into_os_string(plaintext: Zeroizing<Vec<u8>>) -> OsString {
    OsString::from(String::from_utf8_lossy(&plaintext).into_owned())
}
