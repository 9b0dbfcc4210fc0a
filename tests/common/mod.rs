#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::io::Write;
use std::rc::Rc;

use anyhow::Result;
use tempfile::NamedTempFile;

use ghtoken::github::{
    ApiError, Authorization, AuthorizationLinks, AuthorizationRequest, BasicCredentials,
    GithubApi, Identity, Link,
};
use ghtoken::resolve::ResolverConfig;
use ghtoken::sources::git::GitConfig;
use ghtoken::sources::helper::TokenHelper;
use ghtoken::sources::keychain::{Keychain, KeychainQuery};

pub const TOKEN_A: &str = "deadbeefdeadbeefdeadbeefdeadbeefdeadbeef";
pub const TOKEN_B: &str = "0123456789abcdef0123456789abcdef01234567";
pub const TOKEN_C: &str = "cafebabecafebabecafebabecafebabecafebabe";

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CurrentUser(String),
    CreateAuthorization { user: String, otp: Option<String> },
    DeleteAuthorization(String),
}

/// Scripted stand-in for the GitHub API that records every call.
#[derive(Default)]
pub struct MockApi {
    identities: HashMap<String, String>,
    authorizations: RefCell<VecDeque<Result<Authorization, ApiError>>>,
    calls: RefCell<Vec<Call>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identity(mut self, token: &str, login: &str) -> Self {
        self.identities.insert(token.to_string(), login.to_string());
        self
    }

    pub fn authorization(self, result: Result<Authorization, ApiError>) -> Self {
        self.authorizations.borrow_mut().push_back(result);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::DeleteAuthorization(href) => Some(href),
                _ => None,
            })
            .collect()
    }

    pub fn checked_tokens(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::CurrentUser(token) => Some(token),
                _ => None,
            })
            .collect()
    }
}

impl GithubApi for MockApi {
    async fn current_user(&self, token: &str) -> Result<Identity, ApiError> {
        self.calls
            .borrow_mut()
            .push(Call::CurrentUser(token.to_string()));
        match self.identities.get(token) {
            Some(login) => Ok(Identity {
                login: login.clone(),
            }),
            None => Err(bad_credentials()),
        }
    }

    async fn create_authorization(
        &self,
        credentials: &BasicCredentials,
        _request: &AuthorizationRequest,
    ) -> Result<Authorization, ApiError> {
        self.calls.borrow_mut().push(Call::CreateAuthorization {
            user: credentials.username.clone(),
            otp: credentials.otp.clone(),
        });
        self.authorizations
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(bad_credentials()))
    }

    async fn delete_authorization(
        &self,
        _credentials: &BasicCredentials,
        href: &str,
    ) -> Result<(), ApiError> {
        self.calls
            .borrow_mut()
            .push(Call::DeleteAuthorization(href.to_string()));
        Ok(())
    }
}

pub fn bad_credentials() -> ApiError {
    ApiError::Status {
        status: 401,
        body: r#"{"message":"Bad credentials"}"#.to_string(),
    }
}

pub fn created(token: &str, href: &str) -> Result<Authorization, ApiError> {
    Ok(Authorization {
        token: token.to_string(),
        links: AuthorizationLinks {
            self_link: Link {
                href: href.to_string(),
            },
        },
    })
}

/// Shared call counter that stays readable after a mock is boxed away.
#[derive(Clone, Default)]
pub struct Counter(Rc<Cell<usize>>);

impl Counter {
    pub fn bump(&self) {
        self.0.set(self.0.get() + 1);
    }

    pub fn get(&self) -> usize {
        self.0.get()
    }
}

#[derive(Clone, Default)]
pub struct MockGit {
    pub values: HashMap<String, Vec<String>>,
    pub calls: Counter,
}

impl GitConfig for MockGit {
    fn get_all(&self, key: &str) -> Result<Vec<String>> {
        self.calls.bump();
        Ok(self.values.get(key).cloned().unwrap_or_default())
    }
}

#[derive(Clone, Default)]
pub struct MockHelper {
    pub token: Option<String>,
    pub calls: Counter,
}

impl TokenHelper for MockHelper {
    fn token(&self, _host: &str) -> Result<Option<String>> {
        self.calls.bump();
        Ok(self.token.clone())
    }
}

#[derive(Clone, Default)]
pub struct MockKeychain {
    pub passwords: Vec<(KeychainQuery, String)>,
    pub attributes: Option<String>,
    pub calls: Counter,
}

impl Keychain for MockKeychain {
    fn password(&self, query: &KeychainQuery) -> Result<Option<String>> {
        self.calls.bump();
        Ok(self
            .passwords
            .iter()
            .find(|(q, _)| q == query)
            .map(|(_, secret)| secret.clone()))
    }

    fn attributes(&self, _query: &KeychainQuery) -> Result<Option<String>> {
        self.calls.bump();
        Ok(self.attributes.clone())
    }
}

pub fn write_file(contents: &str) -> NamedTempFile {
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    f
}

pub fn path_of(f: &NamedTempFile) -> String {
    f.path().to_str().unwrap().to_string()
}

/// Config that touches nothing on the host unless a test points it somewhere.
pub fn isolated_config() -> ResolverConfig {
    ResolverConfig {
        manual_login: false,
        netrc_path: "/nonexistent/ghtoken-test/netrc".to_string(),
        hub_path: "/nonexistent/ghtoken-test/hub".to_string(),
        oauth_paths: vec!["/nonexistent/ghtoken-test/oauth".to_string()],
        composer_path: "/nonexistent/ghtoken-test/composer.json".to_string(),
        ..ResolverConfig::default()
    }
}
