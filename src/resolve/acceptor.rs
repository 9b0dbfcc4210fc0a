use crate::github::GithubApi;

use super::{Capabilities, ResolveError, ResolverConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acceptance {
    /// `login` is absent when validation is switched off.
    Accepted { login: Option<String> },
    Rejected(String),
}

/// Checks a candidate token against `GET /user` and the pinned login.
pub struct Acceptor<'a, A> {
    api: &'a A,
    config: &'a ResolverConfig,
    caps: &'a Capabilities,
}

impl<'a, A: GithubApi> Acceptor<'a, A> {
    pub fn new(api: &'a A, config: &'a ResolverConfig, caps: &'a Capabilities) -> Self {
        Self { api, config, caps }
    }

    pub async fn accept(&self, token: &str) -> Result<Acceptance, ResolveError> {
        if !self.config.check_token {
            return Ok(Acceptance::Accepted { login: None });
        }

        let identity = match self.api.current_user(token).await {
            Ok(identity) => identity,
            Err(e) if self.config.explode => return Err(e.into()),
            Err(e) => {
                let reason = e.message();
                self.caps
                    .debug(&format!("token is not acceptable: {reason}"));
                return Ok(Acceptance::Rejected(reason));
            }
        };

        if !self.config.allows_login(Some(&identity.login)) {
            let reason = format!(
                "identifies {:?} instead of {:?}",
                identity.login,
                self.config.github_login.as_deref().unwrap_or_default()
            );
            self.caps
                .debug(&format!("token is not acceptable: {reason}"));
            return Ok(Acceptance::Rejected(reason));
        }

        Ok(Acceptance::Accepted {
            login: Some(identity.login),
        })
    }
}
