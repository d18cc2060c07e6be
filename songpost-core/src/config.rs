use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_API_URL: &str = "http://localhost:3000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const ENV_API_URL: &str = "SONGPOST_API_URL";
const ENV_USER_AGENT: &str = "SONGPOST_USER_AGENT";
const ENV_TIMEOUT_SECS: &str = "SONGPOST_TIMEOUT_SECS";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// YAML config file structure. Every key is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigYaml {
    pub api_base_url: Option<String>,
    pub user_agent: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

/// Runtime configuration for talking to the song API
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Base URL the `/songs` path is resolved against
    pub api_base_url: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            user_agent: format!("songpost/{}", env!("CARGO_PKG_VERSION")),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Defaults, then `~/.songpost/config.yaml`, then environment (`.env` included).
    pub fn load() -> Result<Self, ConfigError> {
        if dotenvy::dotenv().is_ok() {
            info!("Loaded environment overrides from .env");
        }
        let mut config = Self::default();
        if let Some(path) = Self::default_config_path() {
            if let Some(yaml) = Self::read_yaml(&path)? {
                info!("Loading config from {}", path.display());
                config.apply_yaml(yaml);
            }
        }
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        debug!("Resolved config: {:?}", config);
        Ok(config)
    }

    pub fn default_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".songpost").join("config.yaml"))
    }

    /// Read a YAML config file. A missing file is not an error.
    pub fn read_yaml(path: &Path) -> Result<Option<ConfigYaml>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        let yaml = serde_yaml::from_str(&content).map_err(|e| {
            ConfigError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        Ok(Some(yaml))
    }

    pub fn apply_yaml(&mut self, yaml: ConfigYaml) {
        if let Some(url) = yaml.api_base_url.filter(|s| !s.is_empty()) {
            self.api_base_url = url;
        }
        if let Some(agent) = yaml.user_agent.filter(|s| !s.is_empty()) {
            self.user_agent = agent;
        }
        if let Some(timeout) = yaml.request_timeout_secs {
            self.request_timeout_secs = timeout;
        }
    }

    /// Apply `SONGPOST_*` overrides from `lookup`. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|s| !s.is_empty());
        if let Some(url) = get(ENV_API_URL) {
            self.api_base_url = url;
        }
        if let Some(agent) = get(ENV_USER_AGENT) {
            self.user_agent = agent;
        }
        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            self.request_timeout_secs = raw.trim().parse().map_err(|_| {
                ConfigError::Config(format!("{} must be a whole number of seconds, got {:?}", ENV_TIMEOUT_SECS, raw))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::Config("API base URL is empty".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Config(
                "Request timeout must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }

    pub fn save_to_yaml(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = ConfigYaml {
            api_base_url: Some(self.api_base_url.clone()),
            user_agent: Some(self.user_agent.clone()),
            request_timeout_secs: Some(self.request_timeout_secs),
        };
        let content =
            serde_yaml::to_string(&yaml).map_err(|e| ConfigError::Serialization(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn read_yaml_missing_file_is_none() {
        let tmp = TempDir::new().unwrap();
        let result = Config::read_yaml(&tmp.path().join("config.yaml")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn read_yaml_partial_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "api_base_url: https://api.songpost.dev\n").unwrap();

        let mut config = Config::default();
        config.apply_yaml(Config::read_yaml(&path).unwrap().unwrap());
        assert_eq!(config.api_base_url, "https://api.songpost.dev");
        assert_eq!(config.request_timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn read_yaml_rejects_malformed_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "request_timeout_secs: soon\n").unwrap();
        let result = Config::read_yaml(&path);
        assert!(matches!(result, Err(ConfigError::Serialization(_))));
    }

    #[test]
    fn env_overrides_yaml() {
        let mut config = Config::default();
        config.apply_yaml(ConfigYaml {
            api_base_url: Some("https://from-yaml.example".to_string()),
            user_agent: None,
            request_timeout_secs: Some(30),
        });
        config
            .apply_env(env_from(&[
                ("SONGPOST_API_URL", "https://from-env.example"),
                ("SONGPOST_USER_AGENT", ""),
            ]))
            .unwrap();
        assert_eq!(config.api_base_url, "https://from-env.example");
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.user_agent.starts_with("songpost/"));
    }

    #[test]
    fn env_timeout_must_be_numeric() {
        let mut config = Config::default();
        let result = config.apply_env(env_from(&[("SONGPOST_TIMEOUT_SECS", "ten")]));
        assert!(matches!(result, Err(ConfigError::Config(_))));
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let config = Config {
            request_timeout_secs: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn save_and_read_yaml_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("config.yaml");
        let config = Config {
            api_base_url: "https://api.songpost.dev".to_string(),
            user_agent: "songpost-test".to_string(),
            request_timeout_secs: 3,
        };
        config.save_to_yaml(&path).unwrap();

        let mut loaded = Config::default();
        loaded.apply_yaml(Config::read_yaml(&path).unwrap().unwrap());
        assert_eq!(loaded, config);
    }
}
