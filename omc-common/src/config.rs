//! Configuration file loading and setting resolution
//!
//! Every setting is resolved in the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Command-line and environment values are merged by the binary's argument
//! parser before they reach [`Settings::resolve`].

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::{Error, Result};

pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_FOLDER: &str = "data";
pub const DEFAULT_MAX_IDS_PER_REQUEST: usize = 500;
pub const DEFAULT_OSU_API_BASE_URL: &str = "https://osu.ppy.sh/api/v2";
pub const DEFAULT_OSU_TOKEN_URL: &str = "https://osu.ppy.sh/oauth/token";
/// Upstream accepts at most 50 ids per lookup
pub const DEFAULT_CHUNK_SIZE: usize = 50;
pub const DEFAULT_REQUEST_INTERVAL_MS: u64 = 250;

/// Configuration file contents; every field is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    #[serde(default)]
    pub bind: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    /// Folder containing the rule data (artists/, overrides/, sources/, labels/)
    #[serde(default)]
    pub data_folder: Option<PathBuf>,

    /// Shared secret for protected routes; auth is disabled when unset
    #[serde(default)]
    pub api_secret: Option<String>,

    #[serde(default)]
    pub max_ids_per_request: Option<usize>,

    #[serde(default)]
    pub osu: OsuConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[osu]` table: catalog API credentials and request pacing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OsuConfig {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub token_url: Option<String>,
    #[serde(default)]
    pub chunk_size: Option<usize>,
    #[serde(default)]
    pub request_interval_ms: Option<u64>,
}

/// `[logging]` table
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(Error::Config(format!(
                "Unknown log format '{}' (expected text or json)",
                other
            ))),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Load the explicit file if given, else the first default location
    ///
    /// An explicit path must exist. With no explicit path and no file at the
    /// default locations, an empty config is returned.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match default_config_path() {
            Some(path) => {
                debug!(path = %path.display(), "Loading config file");
                Self::from_file(&path)
            }
            None => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }
}

/// First existing default config file:
/// `~/.config/omc/config.toml`, then `/etc/omc/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("omc").join("config.toml"));
    let system_config = PathBuf::from("/etc/omc/config.toml");

    user_config
        .into_iter()
        .chain(std::iter::once(system_config))
        .find(|path| path.is_file())
}

/// Values taken from the command line or environment
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub data_folder: Option<PathBuf>,
    pub api_secret: Option<String>,
    pub osu_client_id: Option<String>,
    pub osu_client_secret: Option<String>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

/// Catalog API client settings after resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsuSettings {
    pub client_id: String,
    pub client_secret: String,
    pub api_base_url: String,
    pub token_url: String,
    pub chunk_size: usize,
    pub request_interval_ms: u64,
}

/// Fully resolved service settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind: String,
    pub port: u16,
    pub data_folder: PathBuf,
    pub api_secret: Option<String>,
    pub max_ids_per_request: usize,
    pub osu: OsuSettings,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Settings {
    /// Merge overrides over the file over compiled defaults
    ///
    /// Catalog API credentials have no default; missing ones are an error.
    pub fn resolve(overrides: SettingsOverrides, file: TomlConfig) -> Result<Self> {
        let client_id = non_empty(overrides.osu_client_id.or(file.osu.client_id))
            .ok_or_else(|| Error::Config("osu client id is not configured (OSU_CLIENT_ID)".into()))?;
        let client_secret = non_empty(overrides.osu_client_secret.or(file.osu.client_secret))
            .ok_or_else(|| {
                Error::Config("osu client secret is not configured (OSU_CLIENT_SECRET)".into())
            })?;

        let chunk_size = file.osu.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE);
        if chunk_size == 0 || chunk_size > DEFAULT_CHUNK_SIZE {
            return Err(Error::Config(format!(
                "osu.chunk_size must be between 1 and {}",
                DEFAULT_CHUNK_SIZE
            )));
        }

        let max_ids_per_request = file
            .max_ids_per_request
            .unwrap_or(DEFAULT_MAX_IDS_PER_REQUEST);
        if max_ids_per_request == 0 {
            return Err(Error::Config("max_ids_per_request must be positive".into()));
        }

        Ok(Self {
            bind: overrides
                .bind
                .or(file.bind)
                .unwrap_or_else(|| DEFAULT_BIND.to_string()),
            port: overrides.port.or(file.port).unwrap_or(DEFAULT_PORT),
            data_folder: overrides
                .data_folder
                .or(file.data_folder)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FOLDER)),
            api_secret: non_empty(overrides.api_secret.or(file.api_secret)),
            max_ids_per_request,
            osu: OsuSettings {
                client_id,
                client_secret,
                api_base_url: file
                    .osu
                    .api_base_url
                    .unwrap_or_else(|| DEFAULT_OSU_API_BASE_URL.to_string()),
                token_url: file
                    .osu
                    .token_url
                    .unwrap_or_else(|| DEFAULT_OSU_TOKEN_URL.to_string()),
                chunk_size,
                request_interval_ms: file
                    .osu
                    .request_interval_ms
                    .unwrap_or(DEFAULT_REQUEST_INTERVAL_MS),
            },
            log_level: overrides.log_level.unwrap_or(file.logging.level),
            log_format: overrides.log_format.unwrap_or(file.logging.format),
        })
    }
}

/// Blank strings count as unset
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
