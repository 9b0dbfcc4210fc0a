use std::collections::HashMap;

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
struct ComposerFile {
    #[serde(default)]
    config: ComposerConfig,
}

#[derive(Debug, Default, Deserialize)]
struct ComposerConfig {
    #[serde(default, rename = "github-oauth")]
    github_oauth: HashMap<String, String>,
}

/// `config.github-oauth[host]` from a composer `config.json`.
pub fn token_for_host(contents: &str, host: &str) -> Result<Option<String>, serde_json::Error> {
    let file: ComposerFile = serde_json::from_str(contents)?;
    Ok(file.config.github_oauth.get(host).cloned())
}
