//! Configuration management for Dropdeck

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub store: StoreConfig,
    #[serde(default)]
    pub publish: PublishConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path to the task collection JSON file. Tilde is expanded.
    pub path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Full URL of a publish route to dispatch through. When unset, the
    /// dispatcher talks to the provider directly using env credentials.
    pub endpoint: Option<String>,
}

impl Config {
    /// Load configuration from a specific path
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults when no file exists.
    /// A file that exists but fails to parse is still an error.
    pub fn load_or_default() -> Result<Self> {
        let config_path = resolve_config_path()?;
        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Ok(Self::default_config())
        }
    }

    /// Create a default configuration
    pub fn default_config() -> Self {
        Self {
            store: StoreConfig {
                path: "~/.local/share/dropdeck/tasks.json".to_string(),
            },
            publish: PublishConfig { endpoint: None },
        }
    }

    /// The store path with the tilde expanded.
    pub fn expand_store_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.store.path).to_string())
    }
}

/// Resolve the configuration file path following XDG Base Directory spec
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("DROPDECK_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("dropdeck").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default_config();
        assert_eq!(config.store.path, "~/.local/share/dropdeck/tasks.json");
        assert!(config.publish.endpoint.is_none());
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config: Config = toml::from_str(
            r#"
            [store]
            path = "/tmp/tasks.json"
            "#,
        )
        .unwrap();
        assert_eq!(config.store.path, "/tmp/tasks.json");
        assert!(config.publish.endpoint.is_none());
    }

    #[test]
    fn test_parse_with_publish_endpoint() {
        let config: Config = toml::from_str(
            r#"
            [store]
            path = "/tmp/tasks.json"

            [publish]
            endpoint = "http://127.0.0.1:8787/api/instagram/publish"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.publish.endpoint.as_deref(),
            Some("http://127.0.0.1:8787/api/instagram/publish")
        );
    }

    #[test]
    fn test_parse_rejects_missing_store() {
        let result: std::result::Result<Config, _> = toml::from_str("[publish]\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_expand_store_path_leaves_absolute_untouched() {
        let config: Config = toml::from_str(
            r#"
            [store]
            path = "/var/lib/dropdeck/tasks.json"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.expand_store_path(),
            PathBuf::from("/var/lib/dropdeck/tasks.json")
        );
    }
}
