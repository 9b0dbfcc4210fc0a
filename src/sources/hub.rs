use std::collections::HashMap;

use serde::Deserialize;

/// One account listed under a host in hub's YAML config.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct HubEntry {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub oauth_token: Option<String>,
}

pub type HubConfig = HashMap<String, Vec<HubEntry>>;

pub fn parse(contents: &str) -> Result<HubConfig, serde_yaml::Error> {
    if contents.trim().is_empty() {
        return Ok(HubConfig::new());
    }
    serde_yaml::from_str(contents)
}
