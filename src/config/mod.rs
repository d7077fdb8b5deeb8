//! # Configuration Management Module
//!
//! Host-side configuration for the `deskpet` binary: where the storage root lives and
//! how logging is set up. This is separate from the persisted `settings.json` record,
//! which holds the user's in-app preferences and is managed by the settings repository.
//!
//! ## Configuration File Format
//!
//! ```toml
//! [storage]
//! root = "./deskpet-data"
//!
//! [logging]
//! level = "info"
//! file = "deskpet.log"
//! ```
//!
//! CLI arguments take precedence over the file, which takes precedence over defaults.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Application-private storage root; `data/` and `backups/` live beneath it.
    pub root: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: "./deskpet-data".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Parsed level, falling back to `Info` for unrecognized names.
    pub fn level_filter(&self) -> log::LevelFilter {
        self.level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists. Only a missing file yields `None`; a file that
    /// fails to read, parse, or validate is an error.
    pub async fn load_if_present(path: &str) -> Result<Option<Self>> {
        let present = fs::try_exists(path)
            .await
            .map_err(|e| anyhow!("Failed to stat config file {}: {}", path, e))?;
        if !present {
            return Ok(None);
        }
        Config::load(path).await.map(Some)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage.root.trim().is_empty() {
            return Err(anyhow!("storage.root must not be empty"));
        }
        if self.logging.level.parse::<log::LevelFilter>().is_err() {
            return Err(anyhow!(
                "logging.level '{}' is not one of off, error, warn, info, debug, trace",
                self.logging.level
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_round_trips_through_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        let path = path.to_str().unwrap();

        tokio_test::block_on(Config::create_default(path)).unwrap();
        let loaded = tokio_test::block_on(Config::load(path)).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn absent_file_is_not_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        let loaded = tokio_test::block_on(Config::load_if_present(path.to_str().unwrap()));
        assert!(loaded.unwrap().is_none());
    }

    #[test]
    fn malformed_file_is_reported() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[storage\nroot = ").unwrap();
        let path = path.to_str().unwrap();
        assert!(tokio_test::block_on(Config::load_if_present(path)).is_err());

        std::fs::write(path, "[logging]\nlevel = \"loud\"\n").unwrap();
        assert!(tokio_test::block_on(Config::load_if_present(path)).is_err());
    }

    #[test]
    fn missing_sections_take_defaults() {
        let config: Config = toml::from_str("[storage]\nroot = \"/tmp/pet\"\n").unwrap();
        assert_eq!(config.storage.root, "/tmp/pet");
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.storage.root = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn level_filter_parses_names() {
        let logging = LoggingConfig {
            level: "debug".to_string(),
            file: None,
        };
        assert_eq!(logging.level_filter(), log::LevelFilter::Debug);
    }
}
