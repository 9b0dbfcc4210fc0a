use std::io::Write;
use tempfile::NamedTempFile;

use ghtoken::resolve::ResolverConfig;
use ghtoken::util::config::AppConfig;

#[test]
fn test_load_full_config() {
    let toml = r#"
[github]
api_url = "https://github.example.com/api/v3"
login = "alice"
scopes = ["repo"]
note = "ci token"

[discovery]
auto_token = true
auto_password = true
manual_login = false
netrc_path = "/tmp/netrc"
hub_path = "/tmp/hub"
oauth_paths = ["/tmp/a", "/tmp/b"]
composer_path = "/tmp/composer.json"
git_config_keys = ["github.token"]

[validation]
check_token = false
explode = true
max_otp_attempts = 5
"#;
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(toml.as_bytes()).unwrap();

    let config = AppConfig::load(Some(f.path())).unwrap().resolver_config();
    assert_eq!(config.api_url, "https://github.example.com/api/v3");
    assert_eq!(config.github_login.as_deref(), Some("alice"));
    assert_eq!(config.scopes, vec!["repo"]);
    assert_eq!(config.note, "ci token");
    assert!(config.auto_token);
    assert!(config.auto_password);
    assert!(!config.manual_login);
    assert_eq!(config.netrc_path, "/tmp/netrc");
    assert_eq!(config.hub_path, "/tmp/hub");
    assert_eq!(config.oauth_paths, vec!["/tmp/a", "/tmp/b"]);
    assert_eq!(config.composer_path, "/tmp/composer.json");
    assert_eq!(config.git_config_keys, vec!["github.token"]);
    assert!(!config.check_token);
    assert!(config.explode);
    assert_eq!(config.max_otp_attempts, 5);
    assert!(config.github_token.is_none());
}

#[test]
fn test_load_partial_config_uses_defaults() {
    let toml = r#"
[github]
login = "alice"
"#;
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(toml.as_bytes()).unwrap();

    let config = AppConfig::load(Some(f.path())).unwrap();
    assert_eq!(config.github.login.as_deref(), Some("alice"));
    assert_eq!(config.github.api_url, "https://api.github.com");
    assert_eq!(config.github.scopes, vec!["user", "user:email", "repo"]);
    assert_eq!(config.github.note, "temporary token");
    assert!(!config.discovery.auto_token);
    assert!(config.discovery.manual_login);
    assert!(config.validation.check_token);
    assert_eq!(config.validation.max_otp_attempts, 3);
}

#[test]
fn test_load_nonexistent_file_fails() {
    let result = AppConfig::load(Some(std::path::Path::new("/nonexistent/path/config.toml")));
    assert!(result.is_err());
}

#[test]
fn test_load_invalid_toml_fails() {
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(b"this is not [valid toml {{").unwrap();

    let result = AppConfig::load(Some(f.path()));
    assert!(result.is_err());
}

#[test]
fn test_default_resolver_config() {
    let config = ResolverConfig::default();
    assert!(config.github_token.is_none());
    assert!(config.github_login.is_none());
    assert!(!config.auto_token);
    assert!(!config.auto_password);
    assert!(config.manual_login);
    assert!(config.check_token);
    assert!(!config.explode);
    assert_eq!(config.netrc_path, "~/.netrc");
    assert_eq!(config.oauth_paths, vec!["~/.github-oauth-token"]);
    assert_eq!(config.composer_path, "~/.composer/config.json");
    assert_eq!(
        config.git_config_keys,
        vec!["github.token", "github.oauth-token"]
    );
}

#[test]
fn test_hosts_for_github_com() {
    let config = ResolverConfig::default();
    assert_eq!(config.api_host(), "api.github.com");
    assert_eq!(config.host(), "github.com");
    assert!(config.is_github_com());
}

#[test]
fn test_hosts_for_enterprise() {
    let config = ResolverConfig {
        api_url: "https://ghe.example.com:8443/api/v3".to_string(),
        ..ResolverConfig::default()
    };
    assert_eq!(config.api_host(), "ghe.example.com:8443");
    assert_eq!(config.host(), "ghe.example.com:8443");
    assert!(!config.is_github_com());

    let bare = ResolverConfig {
        api_url: "ghe.internal".to_string(),
        ..ResolverConfig::default()
    };
    assert_eq!(bare.api_host(), "ghe.internal");
}

#[test]
fn test_pinned_login_filter() {
    let open = ResolverConfig::default();
    assert!(open.allows_login(None));
    assert!(open.allows_login(Some("anyone")));

    let pinned = ResolverConfig {
        github_login: Some("alice".to_string()),
        ..ResolverConfig::default()
    };
    assert!(pinned.allows_login(Some("alice")));
    assert!(!pinned.allows_login(Some("bob")));
    assert!(!pinned.allows_login(None));
}
