use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::resolve::ResolverConfig;
use crate::resolve::config::{
    DEFAULT_API_URL, default_composer_path, default_git_config_keys, default_hub_path,
    default_max_otp_attempts, default_netrc_path, default_note, default_oauth_paths,
    default_scopes,
};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub github: GithubConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    #[serde(default = "default_note")]
    pub note: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    #[serde(default)]
    pub auto_token: bool,
    #[serde(default)]
    pub auto_password: bool,
    #[serde(default = "default_true")]
    pub manual_login: bool,
    #[serde(default = "default_netrc_path")]
    pub netrc_path: String,
    #[serde(default = "default_hub_path")]
    pub hub_path: String,
    #[serde(default = "default_oauth_paths")]
    pub oauth_paths: Vec<String>,
    #[serde(default = "default_composer_path")]
    pub composer_path: String,
    #[serde(default = "default_git_config_keys")]
    pub git_config_keys: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default = "default_true")]
    pub check_token: bool,
    #[serde(default)]
    pub explode: bool,
    #[serde(default = "default_max_otp_attempts")]
    pub max_otp_attempts: u32,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}
fn default_true() -> bool {
    true
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            login: None,
            scopes: default_scopes(),
            note: default_note(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            auto_token: false,
            auto_password: false,
            manual_login: true,
            netrc_path: default_netrc_path(),
            hub_path: default_hub_path(),
            oauth_paths: default_oauth_paths(),
            composer_path: default_composer_path(),
            git_config_keys: default_git_config_keys(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            check_token: true,
            explode: false,
            max_otp_attempts: default_max_otp_attempts(),
        }
    }
}

impl AppConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: AppConfig =
                toml::from_str(&content).with_context(|| "Failed to parse config file")?;
            return Ok(config);
        }

        // Search candidate paths in order
        let mut candidates = Vec::new();

        // 1. ~/.config/ghtoken/config.toml (standard XDG on all platforms)
        if let Some(home) = std::env::var_os("HOME") {
            candidates.push(PathBuf::from(home).join(".config/ghtoken/config.toml"));
        }

        // 2. Platform-specific path from `directories` crate
        //    (macOS: ~/Library/Application Support/ghtoken/)
        if let Some(proj_dirs) = ProjectDirs::from("", "", "ghtoken") {
            candidates.push(proj_dirs.config_dir().join("config.toml"));
        }

        for config_path in &candidates {
            if config_path.exists() {
                let content = std::fs::read_to_string(config_path).with_context(|| {
                    format!("Failed to read config file: {}", config_path.display())
                })?;
                let config: AppConfig =
                    toml::from_str(&content).with_context(|| "Failed to parse config file")?;
                return Ok(config);
            }
        }

        Ok(AppConfig::default())
    }

    /// The resolver settings described by this file. The explicit token never
    /// comes from the file.
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            github_token: None,
            api_url: self.github.api_url.clone(),
            github_login: self.github.login.clone(),
            scopes: self.github.scopes.clone(),
            note: self.github.note.clone(),
            auto_token: self.discovery.auto_token,
            auto_password: self.discovery.auto_password,
            manual_login: self.discovery.manual_login,
            check_token: self.validation.check_token,
            explode: self.validation.explode,
            max_otp_attempts: self.validation.max_otp_attempts,
            netrc_path: self.discovery.netrc_path.clone(),
            hub_path: self.discovery.hub_path.clone(),
            oauth_paths: self.discovery.oauth_paths.clone(),
            composer_path: self.discovery.composer_path.clone(),
            git_config_keys: self.discovery.git_config_keys.clone(),
        }
    }

    pub fn log_dir(&self) -> PathBuf {
        if let Some(proj_dirs) = ProjectDirs::from("", "", "ghtoken") {
            return proj_dirs.data_dir().join("logs");
        }
        PathBuf::from(".local/share/ghtoken/logs")
    }
}
