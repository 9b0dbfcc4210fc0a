use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::debug;

use crate::resolve::ResolveError;
use crate::util::paths::expand_path;

/// Per-run memo of source file contents. Each resolved path is read at most
/// once; a missing or unreadable file is remembered as absent.
#[derive(Debug, Default)]
pub struct SourceCache {
    entries: HashMap<PathBuf, Option<String>>,
    explode: bool,
}

impl SourceCache {
    pub fn new(explode: bool) -> Self {
        Self {
            entries: HashMap::new(),
            explode,
        }
    }

    pub fn read(&mut self, path: &str) -> Result<Option<String>, ResolveError> {
        let path = expand_path(path);
        if let Some(outcome) = self.entries.get(&path) {
            debug!(path = %path.display(), hit = outcome.is_some(), "Source cache hit");
            return Ok(outcome.clone());
        }

        let outcome = match std::fs::read_to_string(&path) {
            Ok(content) => {
                debug!(path = %path.display(), "Read source file");
                Some(content)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) if self.explode => {
                return Err(ResolveError::Source { path, source: e });
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Source file unreadable");
                None
            }
        };

        self.entries.insert(path, outcome.clone());
        Ok(outcome)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
