//! Configuration module for Agrisync.
//!
//! Provides typed configuration structs that map to the YAML configuration
//! file, with loading, validation, and defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Top-level configuration for Agrisync.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub store: StoreConfig,
    pub sync: SyncConfig,
    pub logging: LoggingConfig,
}

/// Remote calendar service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the calendar REST service.
    pub base_url: String,
    /// Bearer token for authentication. `None` until the user signs in.
    pub token: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

/// Local persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path to the SQLite database file.
    pub db_path: PathBuf,
}

/// Synchronization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Seconds between connectivity probe checks.
    pub probe_interval: u64,
    /// Whether to assume connectivity when no probe signal is available.
    pub assume_online: bool,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/agrisync/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("agrisync")
            .join("config.yaml")
    }

    /// Platform-appropriate default path for the local database.
    ///
    /// Typically `$XDG_DATA_HOME/agrisync/agrisync.db` on Linux.
    pub fn default_db_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("agrisync")
            .join("agrisync.db")
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.agrisync.dev/v1".to_string(),
            token: None,
            timeout_secs: 30,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: Config::default_db_path(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            probe_interval: 15,
            assume_online: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "https://api.agrisync.dev/v1");
        assert!(config.api.token.is_none());
        assert_eq!(config.api.timeout_secs, 30);
        assert!(config.sync.assume_online);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_valid_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "api:\n  base_url: http://localhost:9000\n  token: secret\n  timeout_secs: 5\n\
             store:\n  db_path: /tmp/agrisync-test.db\n\
             sync:\n  probe_interval: 3\n  assume_online: false\n\
             logging:\n  level: debug"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:9000");
        assert_eq!(config.api.token.as_deref(), Some("secret"));
        assert_eq!(config.sync.probe_interval, 3);
        assert!(!config.sync.assume_online);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_missing_file_errors() {
        let result = Config::load(Path::new("/nonexistent/agrisync.yaml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_or_default_falls_back() {
        let config = Config::load_or_default(Path::new("/nonexistent/agrisync.yaml"));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_roundtrip() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let back: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.api.base_url, config.api.base_url);
    }
}
