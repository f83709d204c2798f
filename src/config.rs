use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::engine::DEFAULT_THRESHOLD;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct RejoinderConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub matching: MatchingConfig,
    pub generator: GeneratorConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub store_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MatchingConfig {
    /// Minimum token overlap for a fuzzy hit, in `[0.0, 1.0]`.
    pub fuzzy_threshold: f64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GeneratorConfig {
    /// `"static"` or `"http"`.
    pub provider: String,
    /// Inference endpoint for the `http` provider.
    pub url: String,
    pub max_length: usize,
    pub timeout_secs: u64,
    /// Reply used by the `static` provider and when generation fails.
    pub fallback_message: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 5000,
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let store_path = default_rejoinder_dir()
            .join("db.json")
            .to_string_lossy()
            .into_owned();
        Self { store_path }
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            provider: "static".into(),
            url: String::new(),
            max_length: 600,
            timeout_secs: 30,
            fallback_message: "Sorry, I'm having some technical trouble right now. Please try again in a little while!".into(),
        }
    }
}

/// Returns `~/.rejoinder/`, or `./.rejoinder/` when there is no home directory.
pub fn default_rejoinder_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".rejoinder")
}

/// Returns the default config file path: `~/.rejoinder/config.toml`
pub fn default_config_path() -> PathBuf {
    default_rejoinder_dir().join("config.toml")
}

impl RejoinderConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            RejoinderConfig::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides (REJOINDER_STORE, REJOINDER_LOG_LEVEL,
    /// REJOINDER_GENERATOR_URL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("REJOINDER_STORE") {
            self.storage.store_path = val;
        }
        if let Ok(val) = std::env::var("REJOINDER_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("REJOINDER_GENERATOR_URL") {
            self.generator.provider = "http".into();
            self.generator.url = val;
        }
    }

    fn validate(&self) -> Result<()> {
        let threshold = self.matching.fuzzy_threshold;
        anyhow::ensure!(
            (0.0..=1.0).contains(&threshold),
            "matching.fuzzy_threshold must be between 0.0 and 1.0, got {threshold}"
        );
        Ok(())
    }

    /// Resolve the store path, expanding `~` if needed.
    pub fn resolved_store_path(&self) -> PathBuf {
        expand_tilde(&self.storage.store_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
