//! Local places a GitHub token or a username/password pair may be found.
//!
//! [`CredentialSources`] reads one source at a time so the resolver can stop
//! as soon as a candidate is accepted.

pub mod composer;
pub mod git;
pub mod helper;
pub mod hub;
pub mod keychain;
pub mod netrc;

use std::fmt;

use crate::cache::SourceCache;
use crate::resolve::{Capabilities, ResolveError, ResolverConfig};
use crate::util::paths::expand_path;

use self::hub::HubConfig;
use self::keychain::KeychainQuery;
use self::netrc::SourceRecord;

/// Length of a classic GitHub OAuth token.
pub const TOKEN_SIZE: usize = 40;

const GITHUB_FOR_MAC_SERVER: &str = "github.com/mac";
const ISSUEPOST_LABEL: &str = "issuepost.github.access_token";

/// An access token. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the token has the shape discovered tokens must have.
    pub fn is_well_formed(token: &str) -> bool {
        token.len() == TOKEN_SIZE
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token(<{} chars>)", self.0.len())
    }
}

/// Where a candidate token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Explicit,
    Netrc,
    CredentialHelper,
    GitConfig,
    Hub,
    OauthFile,
    GithubForMac,
    Issuepost,
    Composer,
    /// Created from a stored username and password.
    Login(LoginSource),
    /// Created from an interactive login.
    Manual,
}

impl TokenSource {
    /// Token discovery order.
    pub const DISCOVERY: [TokenSource; 8] = [
        TokenSource::Netrc,
        TokenSource::CredentialHelper,
        TokenSource::GitConfig,
        TokenSource::Hub,
        TokenSource::OauthFile,
        TokenSource::GithubForMac,
        TokenSource::Issuepost,
        TokenSource::Composer,
    ];

    /// Whether the token was minted during this run.
    pub fn is_temporary(self) -> bool {
        matches!(self, TokenSource::Login(_) | TokenSource::Manual)
    }
}

impl fmt::Display for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenSource::Explicit => write!(f, "explicit token"),
            TokenSource::Netrc => write!(f, "netrc"),
            TokenSource::CredentialHelper => write!(f, "gh auth token"),
            TokenSource::GitConfig => write!(f, "git config"),
            TokenSource::Hub => write!(f, "hub config"),
            TokenSource::OauthFile => write!(f, "oauth token file"),
            TokenSource::GithubForMac => write!(f, "GitHub for Mac keychain"),
            TokenSource::Issuepost => write!(f, "issuepost keychain"),
            TokenSource::Composer => write!(f, "composer config"),
            TokenSource::Login(source) => write!(f, "login from {source}"),
            TokenSource::Manual => write!(f, "interactive login"),
        }
    }
}

/// Where a stored username and password came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginSource {
    Netrc,
    Hub,
    Keychain,
}

impl LoginSource {
    pub const ALL: [LoginSource; 3] = [LoginSource::Netrc, LoginSource::Hub, LoginSource::Keychain];
}

impl fmt::Display for LoginSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoginSource::Netrc => write!(f, "netrc"),
            LoginSource::Hub => write!(f, "hub config"),
            LoginSource::Keychain => write!(f, "keychain"),
        }
    }
}

/// A token together with its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub token: Token,
    pub source: TokenSource,
}

impl Candidate {
    pub fn new(token: impl Into<String>, source: TokenSource) -> Self {
        Self {
            token: Token::new(token),
            source,
        }
    }
}

pub struct CredentialSources<'a> {
    config: &'a ResolverConfig,
    caps: &'a Capabilities,
    cache: &'a mut SourceCache,
}

impl<'a> CredentialSources<'a> {
    pub fn new(
        config: &'a ResolverConfig,
        caps: &'a Capabilities,
        cache: &'a mut SourceCache,
    ) -> Self {
        Self {
            config,
            caps,
            cache,
        }
    }

    /// Well-formed tokens found in one discovery source, in file order.
    pub fn tokens(&mut self, source: TokenSource) -> Result<Vec<String>, ResolveError> {
        let raw = match source {
            TokenSource::Netrc => self.netrc_tokens()?,
            TokenSource::CredentialHelper => self.helper_tokens()?,
            TokenSource::GitConfig => self.git_tokens()?,
            TokenSource::Hub => self.hub_tokens()?,
            TokenSource::OauthFile => self.oauth_file_tokens()?,
            TokenSource::GithubForMac => self.github_for_mac_tokens()?,
            TokenSource::Issuepost => self.issuepost_tokens()?,
            TokenSource::Composer => self.composer_tokens()?,
            TokenSource::Explicit | TokenSource::Login(_) | TokenSource::Manual => Vec::new(),
        };

        let tokens: Vec<String> = raw
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| Token::is_well_formed(t))
            .collect();
        if !tokens.is_empty() {
            self.caps
                .debug(&format!("found {} oauth token(s) in {source}", tokens.len()));
        }
        Ok(tokens)
    }

    /// Username/password pairs found in one source.
    pub fn logins(&mut self, source: LoginSource) -> Result<Vec<(String, String)>, ResolveError> {
        match source {
            LoginSource::Netrc => self.netrc_logins(),
            LoginSource::Hub => self.hub_logins(),
            LoginSource::Keychain => self.keychain_logins(),
        }
    }

    fn netrc(&mut self) -> Result<Vec<SourceRecord>, ResolveError> {
        Ok(self
            .cache
            .read(&self.config.netrc_path)?
            .map(|contents| netrc::parse(&contents))
            .unwrap_or_default())
    }

    fn netrc_entries(&mut self) -> Result<Vec<SourceRecord>, ResolveError> {
        let config = self.config;
        let (api_host, host) = (config.api_host(), config.host());
        Ok(self
            .netrc()?
            .into_iter()
            .filter(|record| netrc::matches_host(record, api_host, host))
            .collect())
    }

    fn hub(&mut self) -> Result<HubConfig, ResolveError> {
        let path = &self.config.hub_path;
        let Some(contents) = self.cache.read(path)? else {
            return Ok(HubConfig::new());
        };
        match hub::parse(&contents) {
            Ok(config) => Ok(config),
            Err(e) if self.config.explode => Err(ResolveError::Parse {
                path: expand_path(path),
                message: e.to_string(),
            }),
            Err(e) => {
                self.caps.debug(&format!("ignoring unparsable hub config: {e}"));
                Ok(HubConfig::new())
            }
        }
    }

    fn netrc_tokens(&mut self) -> Result<Vec<String>, ResolveError> {
        Ok(self
            .netrc_entries()?
            .into_iter()
            .flat_map(|mut record| {
                ["token", "login", "password"]
                    .into_iter()
                    .filter_map(|key| record.remove(key))
                    .collect::<Vec<_>>()
            })
            .collect())
    }

    fn helper_tokens(&mut self) -> Result<Vec<String>, ResolveError> {
        let Some(helper) = &self.caps.token_helper else {
            return Ok(Vec::new());
        };
        let found = helper.token(self.config.host());
        Ok(self
            .tolerate("credential helper", found)?
            .flatten()
            .into_iter()
            .collect())
    }

    fn git_tokens(&mut self) -> Result<Vec<String>, ResolveError> {
        let Some(git) = &self.caps.git_config else {
            return Ok(Vec::new());
        };
        let mut tokens = Vec::new();
        for key in &self.config.git_config_keys {
            let values = git.get_all(key);
            tokens.extend(self.tolerate("git config", values)?.unwrap_or_default());
        }
        Ok(tokens)
    }

    fn hub_tokens(&mut self) -> Result<Vec<String>, ResolveError> {
        let host = self.config.host().to_string();
        Ok(self
            .hub()?
            .remove(&host)
            .unwrap_or_default()
            .into_iter()
            .filter(|entry| self.config.allows_login(entry.user.as_deref()))
            .filter_map(|entry| entry.oauth_token)
            .collect())
    }

    fn oauth_file_tokens(&mut self) -> Result<Vec<String>, ResolveError> {
        let mut tokens = Vec::new();
        for path in &self.config.oauth_paths {
            if let Some(contents) = self.cache.read(path)? {
                tokens.push(contents);
            }
        }
        Ok(tokens)
    }

    fn github_for_mac_tokens(&mut self) -> Result<Vec<String>, ResolveError> {
        if !self.config.is_github_com() {
            return Ok(Vec::new());
        }
        let query = KeychainQuery::Internet {
            server: GITHUB_FOR_MAC_SERVER.to_string(),
            account: self.config.github_login.clone(),
        };
        self.keychain_password("GitHub for Mac token", &query)
    }

    fn issuepost_tokens(&mut self) -> Result<Vec<String>, ResolveError> {
        if !self.config.is_github_com() {
            return Ok(Vec::new());
        }
        let query = KeychainQuery::Generic {
            label: ISSUEPOST_LABEL.to_string(),
        };
        self.keychain_password("issuepost token", &query)
    }

    fn composer_tokens(&mut self) -> Result<Vec<String>, ResolveError> {
        let path = &self.config.composer_path;
        let Some(contents) = self.cache.read(path)? else {
            return Ok(Vec::new());
        };
        match composer::token_for_host(&contents, self.config.host()) {
            Ok(token) => Ok(token.into_iter().collect()),
            Err(e) if self.config.explode => Err(ResolveError::Parse {
                path: expand_path(path),
                message: e.to_string(),
            }),
            Err(e) => {
                self.caps.debug(&format!("ignoring unparsable composer config: {e}"));
                Ok(Vec::new())
            }
        }
    }

    fn netrc_logins(&mut self) -> Result<Vec<(String, String)>, ResolveError> {
        Ok(self
            .netrc_entries()?
            .into_iter()
            .filter(|record| {
                self.config
                    .allows_login(record.get("login").map(String::as_str))
            })
            .filter_map(|mut record| Some((record.remove("login")?, record.remove("password")?)))
            .collect())
    }

    fn hub_logins(&mut self) -> Result<Vec<(String, String)>, ResolveError> {
        let host = self.config.host().to_string();
        Ok(self
            .hub()?
            .remove(&host)
            .unwrap_or_default()
            .into_iter()
            .filter(|entry| self.config.allows_login(entry.user.as_deref()))
            .filter_map(|entry| Some((entry.user?, entry.password?)))
            .collect())
    }

    fn keychain_logins(&mut self) -> Result<Vec<(String, String)>, ResolveError> {
        let Some(keychain) = &self.caps.keychain else {
            return Ok(Vec::new());
        };
        let host = self.config.host().to_string();

        if let Some(login) = &self.config.github_login {
            let query = KeychainQuery::Internet {
                server: host.clone(),
                account: Some(login.clone()),
            };
            self.caps
                .debug(&format!("requesting to load {host} password for {login} from keychain"));
            let found = keychain.password(&query);
            let password = self.tolerate("keychain", found)?.flatten();
            return Ok(password
                .filter(|p| !p.is_empty())
                .map(|p| (login.clone(), p))
                .into_iter()
                .collect());
        }

        let query = KeychainQuery::Internet {
            server: host.clone(),
            account: None,
        };
        self.caps
            .debug(&format!("requesting to load {host} login and password from keychain"));
        let found = keychain.attributes(&query);
        Ok(self
            .tolerate("keychain", found)?
            .flatten()
            .and_then(|dump| keychain::parse_attributes(&dump))
            .into_iter()
            .collect())
    }

    fn keychain_password(
        &mut self,
        name: &str,
        query: &KeychainQuery,
    ) -> Result<Vec<String>, ResolveError> {
        let Some(keychain) = &self.caps.keychain else {
            return Ok(Vec::new());
        };
        self.caps
            .debug(&format!("requesting to load {name} from keychain"));
        let found = keychain.password(query);
        Ok(self
            .tolerate("keychain", found)?
            .flatten()
            .into_iter()
            .collect())
    }

    /// A failing host facility only skips its source, unless errors explode.
    fn tolerate<T>(
        &self,
        what: &'static str,
        result: anyhow::Result<T>,
    ) -> Result<Option<T>, ResolveError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) if self.config.explode => Err(ResolveError::capability(what, e)),
            Err(e) => {
                self.caps.debug(&format!("{what} unavailable: {e:#}"));
                Ok(None)
            }
        }
    }
}
