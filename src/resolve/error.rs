use std::path::PathBuf;

use thiserror::Error;

use crate::github::ApiError;

#[derive(Debug, Error)]
pub enum ResolveError {
    /// A callback the resolver reached was never supplied.
    #[error("{0} callback not set")]
    Configuration(&'static str),

    #[error("GitHub login failed: {0}")]
    Authentication(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Failed to read {}: {source}", path.display())]
    Source {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("{what} failed: {source}")]
    Capability {
        what: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ResolveError {
    pub(crate) fn capability(what: &'static str, source: anyhow::Error) -> Self {
        ResolveError::Capability {
            what,
            source: source.into(),
        }
    }
}
