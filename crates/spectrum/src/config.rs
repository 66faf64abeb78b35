//! Configuration management for spectrum.
//!
//! Configuration is loaded from multiple sources with precedence:
//! 1. Environment variables (SPECTRUM_*)
//! 2. Config file (<data dir>/config.toml)
//! 3. Default values

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use spectrum_core::client::DEFAULT_BASE_URL;
use spectrum_core::orchestrator::{OrchestratorConfig, DEFAULT_SYNTHESIS_PROVIDER};
use std::path::PathBuf;
use std::time::Duration;

/// Aggregation service URL override
pub const ENV_API_URL: &str = "SPECTRUM_API_URL";
/// Config file location override
pub const ENV_CONFIG: &str = "SPECTRUM_CONFIG";
/// Data directory override
pub const ENV_DATA_DIR: &str = "SPECTRUM_DATA_DIR";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Aggregation service settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Cross-model synthesis settings
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    /// Paths
    #[serde(default)]
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the aggregation service
    #[serde(default = "default_api_url")]
    pub url: String,

    /// Request timeout in seconds (covers the provider fan-out)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Provider whose key drives on-demand insights when available
    #[serde(default = "default_canonical_provider")]
    pub canonical_provider: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Base directory for spectrum data
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// SQLite file holding keys, providers, history and settings
    /// (defaults to `<data_dir>/state.db`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_db: Option<PathBuf>,

    /// Where exports are written (defaults to `<data_dir>/exports`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,
}

// Default value functions
fn default_api_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_canonical_provider() -> String {
    DEFAULT_SYNTHESIS_PROVIDER.to_string()
}

fn default_data_dir() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("dev", "spectrum", "spectrum") {
        proj_dirs.data_dir().to_path_buf()
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".spectrum")
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            canonical_provider: default_canonical_provider(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            state_db: None,
            export_dir: None,
        }
    }
}

impl PathsConfig {
    pub fn state_db(&self) -> PathBuf {
        self.state_db
            .clone()
            .unwrap_or_else(|| self.data_dir.join("state.db"))
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("exports"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            synthesis: SynthesisConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        let mut config = if config_path.exists() {
            let content =
                std::fs::read_to_string(&config_path).context("Failed to read config file")?;
            Self::from_toml(&content)?
        } else {
            Config::default()
        };

        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Parse a config file body. Missing sections and fields take defaults.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file")
    }

    /// Apply environment overrides.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_API_URL).filter(|u| !u.trim().is_empty()) {
            self.api.url = url;
        }
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|d| !d.trim().is_empty()) {
            self.paths.data_dir = PathBuf::from(dir);
        }
    }

    /// Save configuration to file.
    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        std::fs::write(&config_path, self.to_toml()?).context("Failed to write config file")?;
        Ok(config_path)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Get the config file path.
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var(ENV_CONFIG) {
            PathBuf::from(path)
        } else if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
            PathBuf::from(dir).join("config.toml")
        } else {
            default_data_dir().join("config.toml")
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    pub fn orchestrator(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            canonical_synthesis_provider: self.synthesis.canonical_provider.clone(),
        }
    }

    /// Ensure all required directories exist.
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.paths.data_dir)
            .context("Failed to create data directory")?;
        std::fs::create_dir_all(self.paths.export_dir())
            .context("Failed to create export directory")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.api.url, "http://localhost:5001/api");
        assert_eq!(config.api.timeout_secs, 120);
        assert_eq!(config.synthesis.canonical_provider, "openai");
        assert_eq!(config.paths.state_db(), config.paths.data_dir.join("state.db"));
        assert_eq!(config.paths.export_dir(), config.paths.data_dir.join("exports"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [api]
            url = "https://spectrum.example.com/api"

            [synthesis]
            canonical_provider = "anthropic"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.url, "https://spectrum.example.com/api");
        assert_eq!(config.api.timeout_secs, 120);
        assert_eq!(config.orchestrator().canonical_synthesis_provider, "anthropic");
        assert_eq!(config.paths, PathsConfig::default());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config::from_toml("[api]\nurl = \"http://file:1/api\"\n").unwrap();

        config.apply_env(|name| (name == ENV_API_URL).then(|| "http://env:2/api".to_string()));
        assert_eq!(config.api.url, "http://env:2/api");

        config.apply_env(|_| Some("  ".to_string()));
        assert_eq!(config.api.url, "http://env:2/api");
    }

    #[test]
    fn test_paths_follow_configured_data_dir() {
        let mut config = Config::from_toml("[paths]\ndata_dir = \"/srv/spectrum\"\n").unwrap();
        assert_eq!(config.paths.state_db(), PathBuf::from("/srv/spectrum/state.db"));
        assert_eq!(config.paths.export_dir(), PathBuf::from("/srv/spectrum/exports"));

        config.apply_env(|name| (name == ENV_DATA_DIR).then(|| "/var/lib/spectrum".to_string()));
        assert_eq!(config.paths.data_dir, PathBuf::from("/var/lib/spectrum"));
        assert!(config.paths.state_db().starts_with("/var/lib/spectrum"));
        assert!(config.paths.export_dir().starts_with("/var/lib/spectrum"));

        let pinned = Config::from_toml(
            "[paths]\ndata_dir = \"/srv/spectrum\"\nstate_db = \"/tmp/s.db\"\n",
        )
        .unwrap();
        assert_eq!(pinned.paths.state_db(), PathBuf::from("/tmp/s.db"));
        assert_eq!(pinned.paths.export_dir(), PathBuf::from("/srv/spectrum/exports"));
    }

    #[test]
    fn test_toml_roundtrip_and_dirs() {
        let temp = tempdir().expect("Failed to create temp dir");
        let config = Config {
            paths: PathsConfig {
                data_dir: temp.path().join("data"),
                state_db: None,
                export_dir: Some(temp.path().join("exports")),
            },
            ..Config::default()
        };

        let parsed = Config::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);

        assert!(!config.paths.export_dir().exists());
        config.ensure_dirs().expect("Failed to create directories");
        assert!(config.paths.data_dir.exists());
        assert!(config.paths.export_dir().exists());
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        assert!(Config::from_toml("[api]\ntimeout_secs = \"soon\"\n").is_err());
    }
}
