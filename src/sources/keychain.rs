use std::io::ErrorKind;
use std::process::Command;

use anyhow::{Context, Result};
use tracing::debug;

/// Selector for a keychain item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeychainQuery {
    Internet {
        server: String,
        account: Option<String>,
    },
    Generic {
        label: String,
    },
}

/// Read access to the platform keychain.
///
/// `Ok(None)` means the item is missing, access was denied, or there is no
/// keychain on this host.
pub trait Keychain {
    /// The secret of the matching item.
    fn password(&self, query: &KeychainQuery) -> Result<Option<String>>;

    /// The attribute dump of the matching item, secret included.
    fn attributes(&self, query: &KeychainQuery) -> Result<Option<String>>;
}

/// macOS keychain through the `security` tool.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecurityCli;

impl SecurityCli {
    fn run(&self, query: &KeychainQuery, flag: &str) -> Result<Option<String>> {
        let mut cmd = Command::new("security");
        match query {
            KeychainQuery::Internet { server, account } => {
                cmd.args(["find-internet-password", "-s", server]);
                if let Some(account) = account {
                    cmd.args(["-a", account]);
                }
            }
            KeychainQuery::Generic { label } => {
                cmd.args(["find-generic-password", "-l", label]);
            }
        }
        cmd.arg(flag);

        let output = match cmd.output() {
            Ok(output) => output,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).context("Failed to run security"),
        };
        if !output.status.success() {
            debug!(?query, "Keychain request denied");
            return Ok(None);
        }

        // `-g` prints the password line on stderr, attributes on stdout.
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(Some(text.trim_end().to_string()))
    }
}

impl Keychain for SecurityCli {
    fn password(&self, query: &KeychainQuery) -> Result<Option<String>> {
        self.run(query, "-w")
    }

    fn attributes(&self, query: &KeychainQuery) -> Result<Option<String>> {
        self.run(query, "-g")
    }
}

/// Pull `(account, password)` out of a `security ... -g` dump.
pub fn parse_attributes(dump: &str) -> Option<(String, String)> {
    let mut account = None;
    let mut password = None;

    for line in dump.lines() {
        if let Some(value) = line
            .trim_start()
            .strip_prefix("\"acct\"<blob>=\"")
            .and_then(|rest| rest.strip_suffix('"'))
        {
            account = Some(value.to_string());
        } else if let Some(value) = line
            .strip_prefix("password: \"")
            .and_then(|rest| rest.strip_suffix('"'))
        {
            password = Some(value.to_string());
        }
    }

    match (account, password) {
        (Some(a), Some(p)) if !a.is_empty() && !p.is_empty() => Some((a, p)),
        _ => None,
    }
}
