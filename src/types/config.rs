//! Configuration for the image cache and its front end.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{CidadeError, CidadeResult};

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = "cidade.toml";

/// Main configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Image cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Image fetcher settings.
    #[serde(default)]
    pub fetcher: FetcherConfig,

    /// Preload session settings.
    #[serde(default)]
    pub preload: PreloadConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

/// Which entry is dropped when the cache is full.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EvictionPolicy {
    /// Oldest inserted entry goes first; lookups never reorder.
    #[default]
    Fifo,
    /// Least recently used goes first; a fresh `get` hit promotes the entry.
    Lru,
}

impl std::fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvictionPolicy::Fifo => write!(f, "fifo"),
            EvictionPolicy::Lru => write!(f, "lru"),
        }
    }
}

/// Image cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of entries.
    #[serde(default = "default_max_size")]
    pub max_size: usize,

    /// Entry time to live in seconds.
    #[serde(default = "default_max_age")]
    pub max_age_secs: u64,

    /// Eviction policy.
    #[serde(default)]
    pub eviction: EvictionPolicy,
}

impl CacheConfig {
    /// Entry time to live as a `Duration`.
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: default_max_size(),
            max_age_secs: default_max_age(),
            eviction: EvictionPolicy::default(),
        }
    }
}

fn default_max_size() -> usize {
    100
}

fn default_max_age() -> u64 {
    30 * 60 // 30 minutes
}

/// Image fetcher settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Timeout per fetch in seconds (0 disables it).
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,

    /// User-Agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl FetcherConfig {
    /// Fetch timeout, `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("cidade-conectada/{}", env!("CARGO_PKG_VERSION"))
}

/// Preload session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreloadConfig {
    /// Maximum preloads in flight per session.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for PreloadConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
        }
    }
}

fn default_max_concurrent() -> usize {
    8
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> CidadeResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> CidadeResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Creates default configuration.
    pub fn default_config() -> Self {
        Self {
            general: GeneralConfig::default(),
            cache: CacheConfig::default(),
            fetcher: FetcherConfig::default(),
            preload: PreloadConfig::default(),
        }
    }

    /// Checks values serde cannot reject on its own.
    pub fn validate(&self) -> CidadeResult<()> {
        if self.cache.max_size == 0 {
            return Err(CidadeError::config("cache.max_size deve ser maior que zero"));
        }
        if self.preload.max_concurrent == 0 {
            return Err(CidadeError::config(
                "preload.max_concurrent deve ser maior que zero",
            ));
        }
        if !matches!(self.general.log_format.as_str(), "text" | "json") {
            return Err(CidadeError::config(format!(
                "general.log_format inválido: '{}' (use text ou json)",
                self.general.log_format
            )));
        }
        Ok(())
    }

    /// Config file under the platform config directory, if there is one.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("cidade").join(CONFIG_FILE_NAME))
    }

    /// Tries the current directory, then the user config directory, then defaults.
    pub fn load_or_default() -> Self {
        if let Ok(config) = Self::load(CONFIG_FILE_NAME) {
            return config;
        }
        Self::user_config_path()
            .and_then(|path| Self::load(path).ok())
            .unwrap_or_else(Self::default_config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
