use std::path::PathBuf;

use directories::BaseDirs;

/// Expand a leading `~` to the home directory and make the result absolute.
pub fn expand_path(path: &str) -> PathBuf {
    let expanded = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => match BaseDirs::new() {
            Some(dirs) => dirs.home_dir().join(rest.trim_start_matches('/')),
            None => PathBuf::from(path),
        },
        _ => PathBuf::from(path),
    };
    std::path::absolute(&expanded).unwrap_or(expanded)
}
