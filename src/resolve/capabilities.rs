use anyhow::Result;

use crate::sources::git::{GitCli, GitConfig};
use crate::sources::helper::{GhCli, TokenHelper};
use crate::sources::keychain::{Keychain, SecurityCli};

pub type AskLogin = Box<dyn Fn() -> Result<String>>;
pub type AskPassword = Box<dyn Fn(&str) -> Result<String>>;
pub type AskOtp = Box<dyn Fn(&str) -> Result<String>>;
pub type Hook = Box<dyn Fn()>;
pub type DebugSink = Box<dyn Fn(&str)>;

/// Callbacks and host facilities injected into the resolver. Every field is
/// optional; reaching a prompt that was never supplied is a configuration
/// error, a missing facility simply skips its sources.
#[derive(Default)]
pub struct Capabilities {
    pub ask_login: Option<AskLogin>,
    pub ask_password: Option<AskPassword>,
    pub ask_otp: Option<AskOtp>,
    /// Runs right before the interactive login prompts.
    pub login_header: Option<Hook>,
    /// Runs once the candidate sequence is used up without acceptance.
    pub after_tokens: Option<Hook>,
    pub debug_sink: Option<DebugSink>,
    pub keychain: Option<Box<dyn Keychain>>,
    pub git_config: Option<Box<dyn GitConfig>>,
    pub token_helper: Option<Box<dyn TokenHelper>>,
}

impl Capabilities {
    /// Host facilities backed by the `security`, `git` and `gh` executables.
    pub fn system() -> Self {
        Self {
            keychain: Some(Box::new(SecurityCli)),
            git_config: Some(Box::new(GitCli)),
            token_helper: Some(Box::new(GhCli)),
            ..Self::default()
        }
    }

    pub fn ask_login(mut self, f: impl Fn() -> Result<String> + 'static) -> Self {
        self.ask_login = Some(Box::new(f));
        self
    }

    pub fn ask_password(mut self, f: impl Fn(&str) -> Result<String> + 'static) -> Self {
        self.ask_password = Some(Box::new(f));
        self
    }

    pub fn ask_otp(mut self, f: impl Fn(&str) -> Result<String> + 'static) -> Self {
        self.ask_otp = Some(Box::new(f));
        self
    }

    pub fn login_header(mut self, f: impl Fn() + 'static) -> Self {
        self.login_header = Some(Box::new(f));
        self
    }

    pub fn after_tokens(mut self, f: impl Fn() + 'static) -> Self {
        self.after_tokens = Some(Box::new(f));
        self
    }

    pub fn debug_sink(mut self, f: impl Fn(&str) + 'static) -> Self {
        self.debug_sink = Some(Box::new(f));
        self
    }

    pub fn keychain(mut self, keychain: impl Keychain + 'static) -> Self {
        self.keychain = Some(Box::new(keychain));
        self
    }

    pub fn git_config(mut self, git: impl GitConfig + 'static) -> Self {
        self.git_config = Some(Box::new(git));
        self
    }

    pub fn token_helper(mut self, helper: impl TokenHelper + 'static) -> Self {
        self.token_helper = Some(Box::new(helper));
        self
    }

    /// Report a non-fatal event to the log and the debug sink.
    pub fn debug(&self, line: &str) {
        tracing::debug!("{line}");
        if let Some(sink) = &self.debug_sink {
            sink(&format!("github: {line}"));
        }
    }
}
