use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};
use tracing::warn;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_BIND: &str = "127.0.0.1:5000";

const SERVER_URL_ENV: &str = "COACH_SERVER_URL";
const BIND_ENV: &str = "COACH_BIND";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            bind: default_bind(),
        }
    }
}

impl Config {
    /// Load from the user config dir, then apply `COACH_SERVER_URL` / `COACH_BIND`.
    /// A missing or broken file falls back to defaults; the env overrides apply either way.
    pub fn load() -> Self {
        match Self::get_config_path() {
            Ok(path) => Self::load_with(&path, |key| std::env::var(key).ok()),
            Err(e) => {
                warn!("{}, using defaults", e);
                let mut config = Self::default();
                config.apply_env(|key| std::env::var(key).ok());
                config
            }
        }
    }

    /// `load` with the file and environment lookup supplied by the caller.
    pub fn load_with(path: &Path, env: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::load_from(path).unwrap_or_else(|e| {
            warn!("Ignoring config file {}: {}", path.display(), e);
            Self::default()
        });
        config.apply_env(env);
        config
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(url) = env(SERVER_URL_ENV) {
            self.server_url = url;
        }
        if let Some(bind) = env(BIND_ENV) {
            self.bind = bind;
        }
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("research-coach").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.server_url, "http://127.0.0.1:5000");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            server_url: "http://coach.local:8080".to_string(),
            bind: "0.0.0.0:8080".to_string(),
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"server_url": "http://example:9000"}"#).unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.server_url, "http://example:9000");
        assert_eq!(config.bind, DEFAULT_BIND);
    }

    fn env_with(url: &'static str) -> impl Fn(&str) -> Option<String> {
        move |key| (key == SERVER_URL_ENV).then(|| url.to_string())
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"server_url": "http://file-host:9000", "bind": "0.0.0.0:9000"}"#).unwrap();
        let config = Config::load_with(&path, env_with("http://env-host:7000"));
        assert_eq!(config.server_url, "http://env-host:7000");
        assert_eq!(config.bind, "0.0.0.0:9000");
    }

    #[test]
    fn test_broken_file_still_takes_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Config::load_from(&path).is_err());

        let config = Config::load_with(&path, env_with("http://env-host:7000"));
        assert_eq!(config.server_url, "http://env-host:7000");
        assert_eq!(config.bind, DEFAULT_BIND);

        let config = Config::load_with(&path, |_| None);
        assert_eq!(config, Config::default());
    }
}
