//! Configuration management for the Beating client.
//!
//! Loads configuration from ${BEATING_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the Beating API.
    pub api_url: String,
}

impl Config {
    const DEFAULT_API_URL: &str = "http://localhost:5000";

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: Self::DEFAULT_API_URL.to_string(),
        }
    }
}

pub mod paths {
    //! Path resolution for Beating configuration and data directories.
    //!
    //! BEATING_HOME resolution order:
    //! 1. BEATING_HOME environment variable (if set)
    //! 2. ~/.config/beating (default)

    use std::path::PathBuf;

    /// Returns the Beating home directory.
    ///
    /// Checks BEATING_HOME env var first, falls back to ~/.config/beating
    pub fn beating_home() -> PathBuf {
        if let Ok(home) = std::env::var("BEATING_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("beating"))
            .expect("Could not determine home directory")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        beating_home().join("config.toml")
    }

    /// Returns the path to the durable key/value state file.
    pub fn state_path() -> PathBuf {
        beating_home().join("state.json")
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    /// Config loading: missing file returns defaults.
    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("nonexistent.toml");

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.api_url, "http://localhost:5000");
    }

    /// Config loading: file value overrides the default.
    #[test]
    fn test_load_overrides_api_url() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(&config_path, "api_url = \"https://api.beating.example\"\n").unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.api_url, "https://api.beating.example");
    }

    /// Config loading: invalid TOML is an error, not a silent default.
    #[test]
    fn test_load_invalid_toml_errors() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(&config_path, "api_url = [not toml").unwrap();

        assert!(Config::load_from(&config_path).is_err());
    }
}
