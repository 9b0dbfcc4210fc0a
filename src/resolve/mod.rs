//! The credential resolution cascade.
//!
//! A [`Resolver`] walks the configured sources in order, validates each
//! candidate, and stops at the first token it accepts. Tokens minted by a
//! login along the way are revoked once the caller is done with the token.

pub mod acceptor;
pub mod capabilities;
pub mod config;
pub mod error;
pub mod login;

use std::panic::{self, AssertUnwindSafe};

use futures::FutureExt;
use tracing::{debug, info};

use crate::cache::SourceCache;
use crate::github::GithubApi;
use crate::sources::{Candidate, CredentialSources, LoginSource, Token, TokenSource};

pub use acceptor::{Acceptance, Acceptor};
pub use capabilities::Capabilities;
pub use config::ResolverConfig;
pub use error::ResolveError;
pub use login::{Attempt, LoginCreator, PendingAuthorization, RollbackSlot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionState {
    Scanning,
    Validating,
    Resolved,
    Exhausted,
}

pub struct Resolver<A> {
    config: ResolverConfig,
    api: A,
    caps: Capabilities,
    cache: SourceCache,
    state: ResolutionState,
}

impl<A: GithubApi> Resolver<A> {
    pub fn new(config: ResolverConfig, api: A, caps: Capabilities) -> Self {
        let cache = SourceCache::new(config.explode);
        Self {
            config,
            api,
            caps,
            cache,
            state: ResolutionState::Scanning,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn state(&self) -> ResolutionState {
        self.state
    }

    /// Resolve a token and hand it to `f`.
    ///
    /// `Ok(None)` means every source was tried without success. An
    /// authorization created on the way is revoked exactly once before this
    /// returns, whatever the outcome: after `f` finishes, when resolution
    /// fails, or when `f` panics (the panic is resumed afterwards).
    pub async fn with_token<T, F>(&mut self, f: F) -> Result<Option<T>, ResolveError>
    where
        F: AsyncFnOnce(&Candidate) -> T,
    {
        let mut rollback = RollbackSlot::default();
        let candidate = match self.resolve(&mut rollback).await {
            Ok(Some(candidate)) => candidate,
            outcome => {
                rollback.release(&self.api).await;
                return outcome.map(|_| None);
            }
        };

        let value = AssertUnwindSafe(f(&candidate)).catch_unwind().await;
        rollback.release(&self.api).await;
        match value {
            Ok(value) => Ok(Some(value)),
            Err(panic) => panic::resume_unwind(panic),
        }
    }

    async fn resolve(
        &mut self,
        rollback: &mut RollbackSlot,
    ) -> Result<Option<Candidate>, ResolveError> {
        self.state = ResolutionState::Scanning;
        let outcome = self.scan(rollback).await;
        if !self.cache.is_empty() {
            debug!(files = self.cache.len(), "Source files consulted");
        }

        match outcome {
            Ok(Some(candidate)) => {
                self.state = ResolutionState::Resolved;
                info!(source = %candidate.source, "Resolved GitHub token");
                Ok(Some(candidate))
            }
            Ok(None) => {
                self.state = ResolutionState::Exhausted;
                debug!("No acceptable GitHub token found");
                Ok(None)
            }
            Err(e) => {
                self.state = ResolutionState::Exhausted;
                Err(e)
            }
        }
    }

    async fn scan(&mut self, rollback: &mut RollbackSlot) -> Result<Option<Candidate>, ResolveError> {
        if let Some(token) = self.config.github_token.clone() {
            return self.offer(Candidate::new(token, TokenSource::Explicit)).await;
        }

        if self.config.auto_token {
            for source in TokenSource::DISCOVERY {
                let tokens = self.sources().tokens(source)?;
                for token in tokens {
                    if let Some(accepted) = self.offer(Candidate::new(token, source)).await? {
                        return Ok(Some(accepted));
                    }
                }
            }
        }

        if self.config.auto_password {
            for source in LoginSource::ALL {
                let logins = self.sources().logins(source)?;
                for (user, password) in logins {
                    let token = self.login(&user, &password, false, rollback).await?;
                    if let Some(token) = token
                        && let Some(accepted) = self
                            .offer(Candidate {
                                token,
                                source: TokenSource::Login(source),
                            })
                            .await?
                    {
                        return Ok(Some(accepted));
                    }
                }
            }
        }

        if self.config.manual_login {
            if let Some(header) = &self.caps.login_header {
                header();
            }
            let user = match &self.config.github_login {
                Some(login) => login.clone(),
                None => {
                    let ask_login = self
                        .caps
                        .ask_login
                        .as_ref()
                        .ok_or(ResolveError::Configuration("ask_login"))?;
                    ask_login().map_err(|e| ResolveError::capability("ask_login", e))?
                }
            };
            let ask_password = self
                .caps
                .ask_password
                .as_ref()
                .ok_or(ResolveError::Configuration("ask_password"))?;
            let password =
                ask_password(&user).map_err(|e| ResolveError::capability("ask_password", e))?;

            if let Some(token) = self.login(&user, &password, true, rollback).await?
                && let Some(accepted) = self
                    .offer(Candidate {
                        token,
                        source: TokenSource::Manual,
                    })
                    .await?
            {
                return Ok(Some(accepted));
            }
        }

        if let Some(after_tokens) = &self.caps.after_tokens {
            after_tokens();
        }
        Ok(None)
    }

    fn sources(&mut self) -> CredentialSources<'_> {
        CredentialSources::new(&self.config, &self.caps, &mut self.cache)
    }

    async fn login(
        &self,
        user: &str,
        password: &str,
        hard_fail: bool,
        rollback: &mut RollbackSlot,
    ) -> Result<Option<Token>, ResolveError> {
        LoginCreator::new(&self.api, &self.config, &self.caps)
            .login(user, password, hard_fail, rollback)
            .await
    }

    /// Validate one candidate; `Some` when it is accepted.
    async fn offer(&mut self, candidate: Candidate) -> Result<Option<Candidate>, ResolveError> {
        self.state = ResolutionState::Validating;
        let acceptance = Acceptor::new(&self.api, &self.config, &self.caps)
            .accept(candidate.token.as_str())
            .await?;
        match acceptance {
            Acceptance::Accepted { login } => {
                debug!(source = %candidate.source, login = ?login, "Token accepted");
                Ok(Some(candidate))
            }
            Acceptance::Rejected(reason) => {
                debug!(source = %candidate.source, reason = %reason, "Token rejected");
                self.state = ResolutionState::Scanning;
                Ok(None)
            }
        }
    }
}
