//! Test support utilities for cellar integration tests.
//!
//! Provides reusable test environment setup and helper commands.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;

use std::path::PathBuf;

use tempfile::TempDir;

/// Test environment with isolated temp directories.
///
/// Each test gets its own working dir and home dir, so the default store
/// (`~/.cellar/store`) and identity land inside the test's home. No
/// process-global state is mutated; tests can run in parallel.
pub struct Test {
    /// Working directory for spawned commands
    pub dir: TempDir,
    /// Temporary home directory
    pub home: TempDir,
}

impl Test {
    /// Create a new empty test environment.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let home = TempDir::new().expect("failed to create temp home");

        Self { dir, home }
    }

    /// Create a test environment with `collection` bootstrapped.
    pub fn bootstrapped(collection: &str) -> Self {
        let t = Self::new();
        let output = t.bootstrap(collection);
        assert!(
            output.status.success(),
            "Failed to bootstrap {}: {}",
            collection,
            String::from_utf8_lossy(&output.stderr)
        );
        t
    }

    /// Create a bootstrapped environment with secrets created in it.
    pub fn with_secrets(collection: &str, secrets: &[(&str, &str)]) -> Self {
        let t = Self::bootstrapped(collection);
        for (name, value) in secrets {
            let secret = format!("{}/{}", collection, name);
            let output = t.create(&secret, value);
            assert!(
                output.status.success(),
                "Failed to create {}: {}",
                secret,
                String::from_utf8_lossy(&output.stderr)
            );
        }
        t
    }

    /// Default store root for this environment.
    pub fn store_root(&self) -> PathBuf {
        self.home.path().join(".cellar").join("store")
    }

    /// Default identity path for this environment.
    pub fn identity_path(&self) -> PathBuf {
        self.home.path().join(".cellar").join("identity")
    }

    /// Write a file into the working directory and return its path.
    pub fn write_file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).expect("failed to write test file");
        path
    }
}
