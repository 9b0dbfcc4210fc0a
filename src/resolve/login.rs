use tracing::{debug, warn};

use crate::github::{ApiError, Authorization, AuthorizationRequest, BasicCredentials, GithubApi};
use crate::sources::Token;

use super::{Capabilities, ResolveError, ResolverConfig};

/// An authorization created during this run, and what it takes to delete it.
#[derive(Debug, Clone)]
pub struct PendingAuthorization {
    pub credentials: BasicCredentials,
    pub href: String,
}

/// Holds the one authorization that still has to be revoked.
#[derive(Debug, Default)]
pub struct RollbackSlot {
    pending: Option<PendingAuthorization>,
}

impl RollbackSlot {
    /// Track `pending`, replacing whatever was tracked before.
    pub fn register(&mut self, pending: PendingAuthorization) {
        if let Some(previous) = self.pending.replace(pending) {
            debug!(href = %previous.href, "Replaced pending authorization");
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn href(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.href.as_str())
    }

    /// Revoke and clear the pending authorization, if any. Failures are
    /// logged; the slot is empty afterwards either way.
    pub async fn release<A: GithubApi>(&mut self, api: &A) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        match api
            .delete_authorization(&pending.credentials, &pending.href)
            .await
        {
            Ok(()) => debug!(href = %pending.href, "Revoked temporary authorization"),
            Err(e) => warn!(href = %pending.href, error = %e, "Failed to revoke temporary authorization"),
        }
    }
}

impl Drop for RollbackSlot {
    fn drop(&mut self) {
        if let Some(pending) = &self.pending {
            warn!(href = %pending.href, "Temporary authorization dropped without revocation");
        }
    }
}

/// Outcome of a single `POST /authorizations`.
#[derive(Debug)]
pub enum Attempt {
    Created(Authorization),
    ChallengeRequired,
    Failed(ApiError),
}

/// Trades a username and password for a freshly created token.
pub struct LoginCreator<'a, A> {
    api: &'a A,
    config: &'a ResolverConfig,
    caps: &'a Capabilities,
}

impl<'a, A: GithubApi> LoginCreator<'a, A> {
    pub fn new(api: &'a A, config: &'a ResolverConfig, caps: &'a Capabilities) -> Self {
        Self { api, config, caps }
    }

    /// Create an authorization for `user`, answering up to
    /// `max_otp_attempts` OTP challenges. The created authorization is
    /// registered in `rollback`.
    ///
    /// With `hard_fail` a failed login is an error; otherwise it yields
    /// `Ok(None)`.
    pub async fn login(
        &self,
        user: &str,
        password: &str,
        hard_fail: bool,
        rollback: &mut RollbackSlot,
    ) -> Result<Option<Token>, ResolveError> {
        let mut credentials = BasicCredentials::new(user, password);
        let mut challenges = 0;

        loop {
            match self.attempt(&credentials).await {
                Attempt::Created(authorization) => {
                    let href = authorization.href().to_string();
                    rollback.register(PendingAuthorization { credentials, href });
                    if authorization.token.is_empty() {
                        return self.fail(
                            user,
                            hard_fail,
                            ApiError::Decode("authorization carries no token".to_string()),
                        );
                    }
                    debug!(user = user, "Created temporary token");
                    return Ok(Some(Token::new(authorization.token)));
                }
                Attempt::ChallengeRequired if challenges < self.config.max_otp_attempts => {
                    challenges += 1;
                    let ask_otp = self
                        .caps
                        .ask_otp
                        .as_ref()
                        .ok_or(ResolveError::Configuration("ask_otp"))?;
                    let otp = ask_otp(user).map_err(|e| ResolveError::capability("ask_otp", e))?;
                    debug!(user = user, attempt = challenges, "Retrying login with OTP");
                    credentials = credentials.with_otp(otp);
                }
                Attempt::ChallengeRequired => {
                    return self.fail(user, hard_fail, ApiError::OtpRequired);
                }
                Attempt::Failed(e) => return self.fail(user, hard_fail, e),
            }
        }
    }

    pub async fn attempt(&self, credentials: &BasicCredentials) -> Attempt {
        let request = AuthorizationRequest {
            scopes: self.config.scopes.clone(),
            note: self.config.note.clone(),
        };
        match self.api.create_authorization(credentials, &request).await {
            Ok(authorization) => Attempt::Created(authorization),
            Err(ApiError::OtpRequired) => Attempt::ChallengeRequired,
            Err(e) => Attempt::Failed(e),
        }
    }

    fn fail(&self, user: &str, hard_fail: bool, error: ApiError) -> Result<Option<Token>, ResolveError> {
        if !hard_fail {
            self.caps
                .debug(&format!("login for {user} failed: {}", error.message()));
            return Ok(None);
        }
        if self.config.explode {
            return Err(ResolveError::Api(error));
        }
        Err(ResolveError::Authentication(error.message()))
    }
}
