//! Configuration management for casa.
//!
//! Configuration is read from `~/.config/casa/config.toml` when it exists.
//! Missing files and missing fields fall back to defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::fetcher::parallel::{DEFAULT_TIMEOUT_SECS, DEFAULT_WORKERS};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
}

/// How followed feeds are retrieved.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Upper bound for a single follow, in seconds.
    pub timeout_secs: u64,
    /// Maximum number of follows fetched at once.
    pub workers: usize,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            workers: DEFAULT_WORKERS,
            user_agent: concat!("casa/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default path, or defaults if there is none.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            tracing::debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/casa/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("casa").join("config.toml"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_partial_config() {
        let content = r#"
[fetch]
timeout_secs = 3
"#;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        assert_eq!(config.fetch.timeout_secs, 3);
        assert_eq!(config.fetch.workers, DEFAULT_WORKERS);
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").expect("Empty config should work");
        assert_eq!(config.fetch, FetchConfig::default());
        assert!(config.fetch.user_agent.starts_with("casa/"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[fetch]\nworkers = 2\nuser_agent = \"test\"").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.fetch.workers, 2);
        assert_eq!(config.fetch.user_agent, "test");
    }

    #[test]
    fn test_invalid_config_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[fetch]\nworkers = \"many\"").unwrap();

        let err = Config::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }
}
