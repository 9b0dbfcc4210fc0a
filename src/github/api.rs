use std::fmt;

use serde_json::Value;
use thiserror::Error;

use super::models::{Authorization, AuthorizationRequest, Identity};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("two-factor authentication code required")]
    OtpRequired,

    #[error("GitHub API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("GitHub API request failed: {0}")]
    Transport(String),

    #[error("Failed to parse GitHub response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Human readable summary: the `message` field of a GitHub error body when
    /// there is one, the full error otherwise.
    pub fn message(&self) -> String {
        if let ApiError::Status { body, .. } = self
            && let Ok(value) = serde_json::from_str::<Value>(body)
            && let Some(message) = value["message"].as_str()
        {
            return message.to_string();
        }
        self.to_string()
    }
}

/// Basic-auth credentials for the authorizations API, plus the OTP code once
/// the user has supplied one.
#[derive(Clone)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
    pub otp: Option<String>,
}

impl BasicCredentials {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            otp: None,
        }
    }

    pub fn with_otp(mut self, otp: String) -> Self {
        self.otp = Some(otp);
        self
    }
}

impl fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("otp", &self.otp.is_some())
            .finish_non_exhaustive()
    }
}

/// The slice of the GitHub REST API the resolver talks to.
#[allow(async_fn_in_trait)]
pub trait GithubApi {
    /// `GET /user` authenticated with `token`.
    async fn current_user(&self, token: &str) -> Result<Identity, ApiError>;

    /// `POST /authorizations` authenticated with basic credentials.
    async fn create_authorization(
        &self,
        credentials: &BasicCredentials,
        request: &AuthorizationRequest,
    ) -> Result<Authorization, ApiError>;

    /// `DELETE <href>`, where `href` is absolute or relative to the API base.
    async fn delete_authorization(
        &self,
        credentials: &BasicCredentials,
        href: &str,
    ) -> Result<(), ApiError>;
}
