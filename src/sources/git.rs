use std::io::ErrorKind;
use std::process::Command;

use anyhow::{Context, Result};

/// Read access to git configuration.
pub trait GitConfig {
    /// Every value set for `key`, one per config line. Empty when unset.
    fn get_all(&self, key: &str) -> Result<Vec<String>>;
}

/// `git config --get-all` on the current environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitCli;

impl GitConfig for GitCli {
    fn get_all(&self, key: &str) -> Result<Vec<String>> {
        let output = match Command::new("git")
            .args(["config", "--get-all", key])
            .output()
        {
            Ok(output) => output,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e).context("Failed to run git config"),
        };

        // Exit status 1 means the key is not set.
        if !output.status.success() {
            return Ok(Vec::new());
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::to_string)
            .collect())
    }
}
