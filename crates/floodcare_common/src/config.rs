//! Configuration for FloodCare.
//!
//! Loads settings from `$FLOODCARE_CONFIG`, then /etc/floodcare/config.toml,
//! or falls back to defaults. Every field has a serde default so a partial
//! file is always valid.

use crate::merge::MergePolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// System config file path
pub const CONFIG_PATH: &str = "/etc/floodcare/config.toml";

/// Environment override for the config file
pub const CONFIG_ENV: &str = "FLOODCARE_CONFIG";

/// Spreadsheet webhook settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Apps Script web-app URL; unset means offline (no push, no pull)
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default = "default_remote_timeout")]
    pub timeout_secs: u64,
}

fn default_remote_timeout() -> u64 {
    15
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self { endpoint: None, timeout_secs: default_remote_timeout() }
    }
}

/// Sync loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_sync_interval")]
    pub interval_secs: u64,

    #[serde(default)]
    pub merge_policy: MergePolicy,
}

fn default_sync_interval() -> u64 {
    10
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { interval_secs: default_sync_interval(), merge_policy: MergePolicy::default() }
    }
}

/// Staff dashboard gate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    #[serde(default = "default_admin_password")]
    pub password: String,
}

fn default_admin_password() -> String {
    "94001".to_string()
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self { password: default_admin_password() }
    }
}

/// Optional external model tier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Base URL of an OpenAI-compatible API
    #[serde(default)]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_model_timeout")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_model_timeout() -> u64 {
    8
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: String::new(),
            model: default_model(),
            api_key: None,
            timeout_secs: default_model_timeout(),
        }
    }
}

/// Where the cache and session flag live
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

/// Service listener
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:7870".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

/// Device location lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoConfig {
    /// Command printing `{"latitude": .., "longitude": ..}` (e.g. termux-location)
    #[serde(default = "default_locate_command")]
    pub locate_command: Vec<String>,

    /// Soft timeout for the SOS flow
    #[serde(default = "default_sos_timeout")]
    pub sos_timeout_secs: u64,
}

fn default_locate_command() -> Vec<String> {
    vec!["termux-location".to_string()]
}

fn default_sos_timeout() -> u64 {
    5
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self { locate_command: default_locate_command(), sos_timeout_secs: default_sos_timeout() }
    }
}

/// Full FloodCare configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FloodConfig {
    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub admin: AdminConfig,

    #[serde(default)]
    pub classifier: ClassifierConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub service: ServiceConfig,

    #[serde(default)]
    pub geo: GeoConfig,
}

impl FloodConfig {
    /// Load config from the env override or system path, or return defaults
    pub fn load() -> Self {
        let candidates: Vec<PathBuf> = std::env::var(CONFIG_ENV)
            .ok()
            .map(PathBuf::from)
            .into_iter()
            .chain(std::iter::once(PathBuf::from(CONFIG_PATH)))
            .collect();

        for path in &candidates {
            if !path.exists() {
                continue;
            }
            match Self::load_from_path(path) {
                Ok(config) => return config,
                Err(e) => warn!("Ignoring unreadable config {}: {:#}", path.display(), e),
            }
        }

        info!("No config file found, using defaults");
        FloodConfig::default()
    }

    /// Load config from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: FloodConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Write the default config (for first-time setup)
    pub fn save_default(path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(&FloodConfig::default())?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        info!("Saved default config to {}", path.display());
        Ok(())
    }

    /// Resolved data directory for cache records and the session flag
    pub fn data_dir(&self) -> PathBuf {
        self.storage.data_dir.clone().unwrap_or_else(crate::paths::default_data_dir)
    }
}
