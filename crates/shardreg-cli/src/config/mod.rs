//! Configuration management.

use anyhow::{Context as _, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use shardreg::RetryConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::output::OutputFormat;

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Control-plane API base URL.
    pub endpoint: Option<String>,

    /// Control-plane API token.
    pub token: Option<String>,

    /// Hosted zone holding the registry.
    pub zone_id: Option<String>,

    /// Registry record name.
    pub record_name: Option<String>,

    /// Record type of the registry entries.
    pub record_type: Option<String>,

    /// Record TTL in seconds.
    pub ttl: Option<u32>,

    /// URL answering with this node's public address.
    pub address_url: Option<String>,

    /// Default output format.
    pub output_format: Option<OutputFormat>,

    /// Retry policy for control-plane calls.
    #[serde(default)]
    pub retry: RetrySettings,
}

/// Retry overrides; unset fields keep the library defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Attempts per store operation.
    pub max_attempts: Option<u32>,

    /// Backoff unit in milliseconds.
    pub delay_unit_ms: Option<u64>,
}

impl RetrySettings {
    /// Apply the overrides to the default policy.
    pub fn to_retry_config(self) -> RetryConfig {
        let mut config = RetryConfig::default();
        if let Some(max) = self.max_attempts {
            config = config.max_attempts(max);
        }
        if let Some(ms) = self.delay_unit_ms {
            config = config.delay_unit(Duration::from_millis(ms));
        }
        config
    }
}

impl Config {
    /// Get the default config file path.
    pub fn default_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "shardreg", "shardreg")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from a file, falling back to defaults if it is absent.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }
}
