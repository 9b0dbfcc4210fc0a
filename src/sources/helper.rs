use std::io::ErrorKind;
use std::process::Command;

use anyhow::{Context, Result};
use tracing::debug;

/// A command-line credential helper that already holds a token.
pub trait TokenHelper {
    fn token(&self, host: &str) -> Result<Option<String>>;
}

/// `gh auth token` from the GitHub CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct GhCli;

impl TokenHelper for GhCli {
    fn token(&self, host: &str) -> Result<Option<String>> {
        debug!(host = host, "Attempting to resolve token via `gh auth token`");
        let output = match Command::new("gh")
            .args(["auth", "token", "--hostname", host])
            .output()
        {
            Ok(output) => output,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).context("Failed to run gh"),
        };

        if !output.status.success() {
            return Ok(None);
        }

        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok((!token.is_empty()).then_some(token))
    }
}
