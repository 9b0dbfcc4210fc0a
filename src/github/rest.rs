use anyhow::{Context, Result, bail};
use reqwest::header::{ACCEPT, HeaderMap};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::debug;

use super::api::{ApiError, BasicCredentials, GithubApi};
use super::models::*;

const OTP_HEADER: &str = "X-GitHub-OTP";

#[derive(Clone)]
pub struct GithubClient {
    client: Client,
    api_url: String,
}

impl GithubClient {
    pub fn new(api_url: &str) -> Result<Self> {
        if !api_url.starts_with("https://") && !is_loopback(api_url) {
            bail!("GitHub API URL must use HTTPS: {}", api_url);
        }

        let client = Client::builder()
            .user_agent("ghtoken")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("https://") || path.starts_with("http://") {
            path.to_string()
        } else {
            format!("{}/{}", self.api_url, path.trim_start_matches('/'))
        }
    }

    fn with_basic_auth(request: RequestBuilder, credentials: &BasicCredentials) -> RequestBuilder {
        let request = request.basic_auth(&credentials.username, Some(&credentials.password));
        match &credentials.otp {
            Some(otp) => request.header(OTP_HEADER, otp),
            None => request,
        }
    }

    async fn send(request: RequestBuilder) -> Result<Response, ApiError> {
        let resp = request
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        if status == StatusCode::UNAUTHORIZED && otp_required(resp.headers()) {
            return Err(ApiError::OtpRequired);
        }

        let body = resp.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

impl GithubApi for GithubClient {
    async fn current_user(&self, token: &str) -> Result<Identity, ApiError> {
        let request = self.client.get(self.url("user")).bearer_auth(token);
        let identity: Identity = Self::send(request)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        debug!(login = %identity.login, "Fetched token identity");
        Ok(identity)
    }

    async fn create_authorization(
        &self,
        credentials: &BasicCredentials,
        request: &AuthorizationRequest,
    ) -> Result<Authorization, ApiError> {
        let builder = self.client.post(self.url("authorizations")).json(request);
        let authorization: Authorization = Self::send(Self::with_basic_auth(builder, credentials))
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        debug!(href = %authorization.href(), "Created authorization");
        Ok(authorization)
    }

    async fn delete_authorization(
        &self,
        credentials: &BasicCredentials,
        href: &str,
    ) -> Result<(), ApiError> {
        let builder = self.client.delete(self.url(href));
        Self::send(Self::with_basic_auth(builder, credentials)).await?;
        debug!(href = href, "Deleted authorization");
        Ok(())
    }
}

fn otp_required(headers: &HeaderMap) -> bool {
    headers
        .get(OTP_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim_start().starts_with("required"))
}

fn is_loopback(api_url: &str) -> bool {
    let Some(rest) = api_url.strip_prefix("http://") else {
        return false;
    };
    let host = rest.split(['/', ':']).next().unwrap_or("");
    matches!(host, "localhost" | "127.0.0.1")
}
