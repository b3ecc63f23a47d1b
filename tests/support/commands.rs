//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::process::Output;

/// Variables that would leak the developer's own setup into a test.
const ISOLATED_VARS: &[&str] = &[
    "CELLAR_ROOT",
    "CELLAR_IDENTITY",
    "CELLAR_CONFIG",
    "CELLAR_RUNTIME_ENV_FILE",
    "CELLAR_LOG",
    "VISUAL",
    "EDITOR",
];

impl Test {
    /// Create a cellar command with an isolated environment.
    ///
    /// Returns a Command configured with:
    /// - HOME set to the temporary home directory
    /// - Current directory set to the test working directory
    /// - cellar's own variables removed and colors disabled
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("cellar").expect("failed to find cellar binary");
        cmd.env("HOME", self.home.path());
        // Windows uses USERPROFILE instead of HOME for home directory
        cmd.env("USERPROFILE", self.home.path());
        cmd.env("NO_COLOR", "1");
        for var in ISOLATED_VARS {
            cmd.env_remove(var);
        }
        cmd.current_dir(self.dir.path());
        cmd
    }

    /// Shortcut for `cellar bootstrap`.
    pub fn bootstrap(&self, collection: &str) -> Output {
        self.cmd()
            .args(["bootstrap", "--collection", collection, "--name", "tester"])
            .output()
            .expect("failed to run cellar bootstrap")
    }

    /// Shortcut for `cellar create`.
    pub fn create(&self, secret: &str, data: &str) -> Output {
        self.cmd()
            .args(["create", secret, data])
            .output()
            .expect("failed to run cellar create")
    }

    /// Shortcut for `cellar update`.
    pub fn update(&self, secret: &str, data: &str) -> Output {
        self.cmd()
            .args(["update", secret, data])
            .output()
            .expect("failed to run cellar update")
    }

    /// Shortcut for `cellar access`.
    pub fn access(&self, secret: &str) -> Output {
        self.cmd()
            .args(["access", secret])
            .output()
            .expect("failed to run cellar access")
    }

    /// Shortcut for `cellar delete`.
    pub fn delete(&self, secret: &str) -> Output {
        self.cmd()
            .args(["delete", secret])
            .output()
            .expect("failed to run cellar delete")
    }

    /// Shortcut for `cellar list`.
    pub fn list(&self, collection: &str) -> Output {
        self.cmd()
            .args(["list", collection])
            .output()
            .expect("failed to run cellar list")
    }

    /// Shortcut for `cellar list --json`.
    pub fn list_json(&self, collection: &str) -> Output {
        self.cmd()
            .args(["list", collection, "--json"])
            .output()
            .expect("failed to run cellar list --json")
    }

    /// Shortcut for `cellar exec --local -- sh -c <script>`.
    pub fn exec_local(&self, script: &str) -> Output {
        self.cmd()
            .args(["exec", "--local", "--", "sh", "-c", script])
            .output()
            .expect("failed to run cellar exec")
    }
}
