//! Service configuration

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Deployment configuration for the report renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Root directory of the object store (template and rendered reports).
    #[serde(default = "default_store_root")]
    pub store_root: PathBuf,
    /// Template file override; defaults to the well-known template key
    /// inside the store.
    #[serde(default)]
    pub template_path: Option<PathBuf>,
    /// Base URL used to build the public address of stored reports. When
    /// unset, responses carry the local storage path instead.
    #[serde(default)]
    pub public_base_url: Option<String>,
}

impl ServiceConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: ServiceConfig = toml::from_str(&content)?;
        Ok(config)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            store_root: default_store_root(),
            template_path: None,
            public_base_url: None,
        }
    }
}

fn default_store_root() -> PathBuf {
    PathBuf::from(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.store_root, PathBuf::from("."));
        assert!(config.template_path.is_none());
        assert!(config.public_base_url.is_none());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "store_root = \"/var/reports\"\npublic_base_url = \"https://cdn.example.org\""
        )
        .unwrap();

        let config = ServiceConfig::from_file(file.path()).unwrap();
        assert_eq!(config.store_root, PathBuf::from("/var/reports"));
        assert_eq!(
            config.public_base_url.as_deref(),
            Some("https://cdn.example.org")
        );
        assert!(config.template_path.is_none());
    }
}
