use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub login: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationRequest {
    pub scopes: Vec<String>,
    pub note: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Authorization {
    #[serde(default)]
    pub token: String,
    #[serde(rename = "_links")]
    pub links: AuthorizationLinks,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationLinks {
    #[serde(rename = "self")]
    pub self_link: Link,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
}

impl Authorization {
    pub fn href(&self) -> &str {
        &self.links.self_link.href
    }
}
