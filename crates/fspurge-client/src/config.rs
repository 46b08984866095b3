//! Store client configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the store is mounted and how it identifies itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Local path at which the store's root is mounted.
    #[serde(default = "default_mount_root")]
    pub mount_root: PathBuf,

    /// File system id to report. Derived from the mount's device number
    /// when unset.
    #[serde(default)]
    pub fs_id: Option<i32>,
}

fn default_mount_root() -> PathBuf {
    PathBuf::from("/")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            mount_root: default_mount_root(),
            fs_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.mount_root, PathBuf::from("/"));
        assert!(config.fs_id.is_none());
    }

    #[test]
    fn test_config_from_toml() {
        let config: StoreConfig = toml::from_str("mount_root = \"/mnt/scratch\"").unwrap();
        assert_eq!(config.mount_root, PathBuf::from("/mnt/scratch"));
        assert!(config.fs_id.is_none());
    }
}
