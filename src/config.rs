use anyhow::{anyhow, ensure, Context, Result};
use derivative::Derivative;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct Config {
    /// Base URL of the analyzer server
    #[derivative(Default(value = "String::from(\"http://localhost:8080\")"))]
    pub server_url: String,

    /// Delay before every poll of the results endpoint
    #[derivative(Default(value = "2000"))]
    pub poll_interval_ms: u64,

    /// Give up after this many polls. Unset polls until a terminal response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_poll_attempts: Option<u32>,

    #[derivative(Default(value = "300"))]
    pub request_timeout_secs: u64,
}

impl Config {
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid configuration in {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.max_poll_attempts != Some(0),
            "max_poll_attempts must be at least 1; remove it to poll without a limit"
        );
        Ok(())
    }

    /// Load from the default location, writing a defaults file there on
    /// first run so it can be edited.
    pub fn load_or_init() -> Result<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            return Self::load(&path);
        }
        let config = Self::default();
        match config.save(&path) {
            Ok(()) => info!(path = %path.display(), "wrote default configuration"),
            Err(e) => warn!(error = %e, "could not write default configuration"),
        }
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("failed to serialize config")?;
        fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn default_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow!("Could not determine config directory"))?;
        Ok(config_dir.join("zip-analyzer").join("config.toml"))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn config_defaults() {
        let config = Config::default();
        assert_eq!(config.server_url, "http://localhost:8080");
        assert_eq!(config.poll_interval_ms, 2000);
        assert_eq!(config.max_poll_attempts, None);
        assert_eq!(config.request_timeout_secs, 300);
    }

    #[test]
    fn config_partial_parse() {
        let config: Config = toml::from_str("server_url = \"http://analyzer:9000\"\n").unwrap();
        assert_eq!(config.server_url, "http://analyzer:9000");
        assert_eq!(config.poll_interval(), Duration::from_millis(2000));
        assert_eq!(config.max_poll_attempts, None);
    }

    #[test]
    fn config_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("config.toml");

        let config = Config {
            server_url: "https://example.com".to_string(),
            poll_interval_ms: 500,
            max_poll_attempts: Some(30),
            request_timeout_secs: 60,
        };
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let loaded = Config::load(&tmp.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn zero_poll_attempts_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "max_poll_attempts = 0\n").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("max_poll_attempts must be at least 1"));

        fs::write(&path, "max_poll_attempts = 1\n").unwrap();
        assert_eq!(Config::load(&path).unwrap().max_poll_attempts, Some(1));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "poll_interval_ms = \"soon\"\n").unwrap();
        assert!(Config::load(&path).is_err());
    }
}
