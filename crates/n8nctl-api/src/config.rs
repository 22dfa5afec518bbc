//! Connection settings for an n8n instance.
//!
//! Settings are layered, highest priority first: command-line flags,
//! the `N8N_API_URL` / `N8N_API_KEY` environment variables, the config
//! file at `~/.config/n8nctl/config.toml`, built-in defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{ApiError, Result};

pub const DEFAULT_URL: &str = "http://localhost:5678";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Resolved connection settings.
#[derive(Debug, Clone)]
pub struct Config {
    /// Instance URL without a trailing slash
    pub base_url: String,
    /// Absent is not an error here; only API calls require a key
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

/// Values supplied on the command line. Highest priority layer.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub config_path: Option<PathBuf>,
}

/// Contents of the config file (all keys optional).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Merge all settings layers into a usable config.
    ///
    /// An explicitly passed config path must exist and parse. The default
    /// path is skipped when missing but still an error when malformed.
    pub fn resolve(overrides: &Overrides) -> Result<Self> {
        let file = match &overrides.config_path {
            Some(path) => Some(FileConfig::load(path)?),
            None => match default_config_path() {
                Some(path) if path.exists() => Some(FileConfig::load(&path)?),
                _ => None,
            },
        };
        Ok(Self::merge(overrides, &env_layer(), file.as_ref()))
    }

    fn merge(overrides: &Overrides, env: &FileConfig, file: Option<&FileConfig>) -> Self {
        let file = file.cloned().unwrap_or_default();
        let url = overrides
            .url
            .clone()
            .or_else(|| env.url.clone())
            .or(file.url)
            .unwrap_or_else(|| DEFAULT_URL.to_string());
        let api_key = overrides
            .api_key
            .clone()
            .or_else(|| env.api_key.clone())
            .or(file.api_key)
            .filter(|key| !key.is_empty());

        Self {
            base_url: url.trim_end_matches('/').to_string(),
            api_key,
            timeout_secs: file.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ApiError::Config(format!("{}: {}", path.display(), e)))?;
        toml::from_str(&raw).map_err(|e| ApiError::Config(format!("{}: {}", path.display(), e)))
    }
}

fn env_layer() -> FileConfig {
    FileConfig {
        url: non_empty_var("N8N_API_URL"),
        api_key: non_empty_var("N8N_API_KEY"),
        timeout_secs: None,
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

/// Default config file location (`~/.config/n8nctl/config.toml` on Linux).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("n8nctl").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn layer(url: Option<&str>, key: Option<&str>) -> FileConfig {
        FileConfig {
            url: url.map(str::to_string),
            api_key: key.map(str::to_string),
            timeout_secs: None,
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::merge(&Overrides::default(), &FileConfig::default(), None);
        assert_eq!(config.base_url, DEFAULT_URL);
        assert_eq!(config.api_key, None);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_flag_beats_env_beats_file() {
        let overrides = Overrides {
            url: Some("http://flag:1".to_string()),
            ..Default::default()
        };
        let env = layer(Some("http://env:2"), Some("env-key"));
        let file = layer(Some("http://file:3"), Some("file-key"));

        let config = Config::merge(&overrides, &env, Some(&file));
        assert_eq!(config.base_url, "http://flag:1");
        // No flag for the key, so the env layer wins
        assert_eq!(config.api_key.as_deref(), Some("env-key"));

        let config = Config::merge(&Overrides::default(), &FileConfig::default(), Some(&file));
        assert_eq!(config.base_url, "http://file:3");
        assert_eq!(config.api_key.as_deref(), Some("file-key"));
    }

    #[test]
    fn test_trailing_slash_stripped() {
        let overrides = Overrides {
            url: Some("http://n8n.example.com/".to_string()),
            ..Default::default()
        };
        let config = Config::merge(&overrides, &FileConfig::default(), None);
        assert_eq!(config.base_url, "http://n8n.example.com");
    }

    #[test]
    fn test_empty_key_treated_as_absent() {
        let env = layer(None, Some(""));
        let config = Config::merge(&Overrides::default(), &env, None);
        assert_eq!(config.api_key, None);
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "url = \"http://n8n.local:5678\"").unwrap();
        writeln!(file, "api_key = \"abc123\"").unwrap();
        writeln!(file, "timeout_secs = 10").unwrap();

        let parsed = FileConfig::load(file.path()).unwrap();
        assert_eq!(parsed.url.as_deref(), Some("http://n8n.local:5678"));
        assert_eq!(parsed.api_key.as_deref(), Some("abc123"));
        assert_eq!(parsed.timeout_secs, Some(10));

        let config = Config::merge(&Overrides::default(), &FileConfig::default(), Some(&parsed));
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn test_load_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "url = [not toml").unwrap();

        let err = FileConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }
}
