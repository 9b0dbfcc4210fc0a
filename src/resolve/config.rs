pub const GITHUB_API: &str = "api.github.com";
pub const GITHUB_HOST: &str = "github.com";
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Everything the resolver needs to know, fixed for the lifetime of a
/// [`Resolver`](super::Resolver).
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Explicit token. When set it is the only candidate.
    pub github_token: Option<String>,
    /// REST API base, e.g. `https://ghe.example.com/api/v3`.
    pub api_url: String,
    /// Pinned login that candidate credentials must belong to.
    pub github_login: Option<String>,
    /// Scopes requested when a login creates a new authorization.
    pub scopes: Vec<String>,
    /// Note attached to created authorizations.
    pub note: String,
    /// Look for existing tokens in local files, git config and the keychain.
    pub auto_token: bool,
    /// Look for stored usernames and passwords and trade them for a token.
    pub auto_password: bool,
    /// Fall back to prompting for username and password.
    pub manual_login: bool,
    /// Validate candidates against `GET /user` before accepting them.
    pub check_token: bool,
    /// Propagate raw errors instead of summaries or silent skips.
    pub explode: bool,
    /// How many OTP codes a single login may ask for.
    pub max_otp_attempts: u32,
    pub netrc_path: String,
    pub hub_path: String,
    pub oauth_paths: Vec<String>,
    pub composer_path: String,
    pub git_config_keys: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            github_token: None,
            api_url: DEFAULT_API_URL.to_string(),
            github_login: None,
            scopes: default_scopes(),
            note: default_note(),
            auto_token: false,
            auto_password: false,
            manual_login: true,
            check_token: true,
            explode: false,
            max_otp_attempts: default_max_otp_attempts(),
            netrc_path: default_netrc_path(),
            hub_path: default_hub_path(),
            oauth_paths: default_oauth_paths(),
            composer_path: default_composer_path(),
            git_config_keys: default_git_config_keys(),
        }
    }
}

impl ResolverConfig {
    /// Host part of the API URL, port included.
    pub fn api_host(&self) -> &str {
        let rest = self
            .api_url
            .strip_prefix("https://")
            .or_else(|| self.api_url.strip_prefix("http://"))
            .unwrap_or(&self.api_url);
        match rest.split('/').next() {
            Some(host) if !host.is_empty() => host,
            _ => GITHUB_API,
        }
    }

    /// Web host the API belongs to. `api.github.com` maps to `github.com`,
    /// enterprise hosts serve both from the same name.
    pub fn host(&self) -> &str {
        match self.api_host() {
            GITHUB_API => GITHUB_HOST,
            other => other,
        }
    }

    pub fn is_github_com(&self) -> bool {
        self.host() == GITHUB_HOST
    }

    /// Whether `login` passes the pinned-login filter.
    pub fn allows_login(&self, login: Option<&str>) -> bool {
        match &self.github_login {
            Some(pinned) => login == Some(pinned.as_str()),
            None => true,
        }
    }
}

pub fn default_scopes() -> Vec<String> {
    ["user", "user:email", "repo"]
        .into_iter()
        .map(String::from)
        .collect()
}
pub fn default_note() -> String {
    "temporary token".to_string()
}
pub fn default_max_otp_attempts() -> u32 {
    3
}
pub fn default_netrc_path() -> String {
    "~/.netrc".to_string()
}
pub fn default_hub_path() -> String {
    std::env::var("HUB_CONFIG").unwrap_or_else(|_| "~/.config/hub".to_string())
}
pub fn default_oauth_paths() -> Vec<String> {
    vec!["~/.github-oauth-token".to_string()]
}
pub fn default_composer_path() -> String {
    "~/.composer/config.json".to_string()
}
pub fn default_git_config_keys() -> Vec<String> {
    vec!["github.token".to_string(), "github.oauth-token".to_string()]
}
