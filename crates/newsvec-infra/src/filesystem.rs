//! Data directory layout.

use std::path::{Path, PathBuf};

use newsvec_types::config::StoreConfig;

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `NEWSVEC_DATA_DIR` environment variable
/// 2. `~/.newsvec`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("NEWSVEC_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".newsvec");
    }

    // Last resort: current directory
    PathBuf::from(".newsvec")
}

/// Directory of the vector store: the configured path or `{data_dir}/vector_store`.
pub fn vector_store_dir(data_dir: &Path, store: &StoreConfig) -> PathBuf {
    store
        .path
        .clone()
        .unwrap_or_else(|| data_dir.join("vector_store"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_store_dir_defaults_under_data_dir() {
        let store = StoreConfig::default();
        assert_eq!(
            vector_store_dir(Path::new("/tmp/nv"), &store),
            PathBuf::from("/tmp/nv/vector_store")
        );
    }

    #[test]
    fn test_vector_store_dir_prefers_configured_path() {
        let store = StoreConfig {
            path: Some(PathBuf::from("/srv/vectors")),
            ..StoreConfig::default()
        };
        assert_eq!(
            vector_store_dir(Path::new("/tmp/nv"), &store),
            PathBuf::from("/srv/vectors")
        );
    }
}
