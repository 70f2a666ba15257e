//! # Configuration Loader
//!
//! Three steps, each kept separate so they can be tested on their own:
//!
//! 1. [`load_config`] reads the TOML file into the [`AppConfig`] DTO and
//!    accepts whatever is in it.
//! 2. [`apply_env_overrides`] lays `GRANTWISE_*` variables over the file.
//! 3. [`resolve_settings`] fills in defaults and validates, producing
//!    [`ClientSettings`].
//!
//! [`load_settings`] runs all three after `dotenvy` has populated the
//! environment from a `.env` file, if one exists.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use gw_app::usecases::WatchSettings;
use gw_app::AppSettings;
use gw_core::config::AppConfig;
use tracing::debug;
use url::Url;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const ENV_API_BASE_URL: &str = "GRANTWISE_API_BASE_URL";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "GRANTWISE_REQUEST_TIMEOUT_SECS";
pub const ENV_POLL_INTERVAL_MS: &str = "GRANTWISE_POLL_INTERVAL_MS";
pub const ENV_OVERLAY_CEILING_SECS: &str = "GRANTWISE_OVERLAY_CEILING_SECS";
pub const ENV_COUNTRY_CODE: &str = "GRANTWISE_COUNTRY_CODE";
pub const ENV_HANDOFF_PATH: &str = "GRANTWISE_HANDOFF_PATH";
pub const ENV_LOG_FILTER: &str = "GRANTWISE_LOG";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("api base URL is not configured (set [api].base_url or {ENV_API_BASE_URL})")]
    MissingBaseUrl,

    #[error("api base URL `{value}` is invalid: {reason}")]
    InvalidBaseUrl { value: String, reason: String },

    #[error("api base URL must use http or https, got `{scheme}`")]
    UnsupportedScheme { scheme: String },

    #[error("`{key}` must be greater than zero")]
    ZeroDuration { key: &'static str },

    #[error("environment variable {key}=`{value}` is not a non-negative integer")]
    InvalidEnv { key: &'static str, value: String },
}

/// Where the resume tickets live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandoffBacking {
    /// Lost when the process exits.
    Memory,
    File(PathBuf),
}

/// Validated settings the wiring layer consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base_url: Url,
    pub request_timeout: Duration,
    pub app: AppSettings,
    pub handoff: HandoffBacking,
    pub log_filter: Option<String>,
}

/// Load configuration from a TOML file.
///
/// Pure data loading: empty strings and odd numbers are passed through as
/// they are. Fails only on I/O or TOML syntax errors.
pub fn load_config(config_path: &Path) -> anyhow::Result<AppConfig> {
    let content = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    let toml_value: toml::Value =
        toml::from_str(&content).context("Failed to parse config as TOML")?;
    AppConfig::from_toml(&toml_value)
}

/// Overlay environment variables on top of the file configuration.
///
/// `lookup` is `std::env::var` in production; empty values are ignored.
pub fn apply_env_overrides<F>(mut config: AppConfig, lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
    let number = |key: &'static str| -> Result<Option<u64>, ConfigError> {
        get(key)
            .map(|value| {
                value.trim().parse::<u64>().map_err(|_| ConfigError::InvalidEnv {
                    key,
                    value: value.clone(),
                })
            })
            .transpose()
    };

    if let Some(base_url) = get(ENV_API_BASE_URL) {
        config.api_base_url = base_url;
    }
    if let Some(secs) = number(ENV_REQUEST_TIMEOUT_SECS)? {
        config.request_timeout_secs = Some(secs);
    }
    if let Some(ms) = number(ENV_POLL_INTERVAL_MS)? {
        config.poll_interval_ms = Some(ms);
    }
    if let Some(secs) = number(ENV_OVERLAY_CEILING_SECS)? {
        config.overlay_ceiling_secs = Some(secs);
    }
    if let Some(country) = get(ENV_COUNTRY_CODE) {
        config.country_code = Some(country);
    }
    if let Some(path) = get(ENV_HANDOFF_PATH) {
        config.handoff_path = PathBuf::from(path);
    }
    if let Some(filter) = get(ENV_LOG_FILTER) {
        config.log_filter = Some(filter);
    }
    Ok(config)
}

pub fn resolve_settings(config: &AppConfig) -> Result<ClientSettings, ConfigError> {
    let raw_url = config.api_base_url.trim();
    if raw_url.is_empty() {
        return Err(ConfigError::MissingBaseUrl);
    }
    let api_base_url = Url::parse(raw_url).map_err(|err| ConfigError::InvalidBaseUrl {
        value: raw_url.to_string(),
        reason: err.to_string(),
    })?;
    if !matches!(api_base_url.scheme(), "http" | "https") {
        return Err(ConfigError::UnsupportedScheme {
            scheme: api_base_url.scheme().to_string(),
        });
    }

    let defaults = WatchSettings::default();
    let watch = WatchSettings {
        poll_interval: positive(
            "poll_interval_ms",
            config.poll_interval_ms.map(Duration::from_millis),
            defaults.poll_interval,
        )?,
        overlay_ceiling: positive(
            "overlay_ceiling_secs",
            config.overlay_ceiling_secs.map(Duration::from_secs),
            defaults.overlay_ceiling,
        )?,
    };
    let request_timeout = positive(
        "request_timeout_secs",
        config.request_timeout_secs.map(Duration::from_secs),
        DEFAULT_REQUEST_TIMEOUT,
    )?;

    let handoff = if config.handoff_path.as_os_str().is_empty() {
        HandoffBacking::Memory
    } else {
        HandoffBacking::File(config.handoff_path.clone())
    };

    let country_code = config
        .country_code
        .as_deref()
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_uppercase);

    Ok(ClientSettings {
        api_base_url,
        request_timeout,
        app: AppSettings {
            watch,
            country_code,
        },
        handoff,
        log_filter: config.log_filter.clone(),
    })
}

fn positive(
    key: &'static str,
    value: Option<Duration>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match value {
        Some(duration) if duration.is_zero() => Err(ConfigError::ZeroDuration { key }),
        Some(duration) => Ok(duration),
        None => Ok(default),
    }
}

/// Full load: `.env`, then the file (when it exists), then the environment.
///
/// A missing config file is not an error; the environment alone may be
/// enough.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<ClientSettings> {
    if let Ok(path) = dotenvy::dotenv() {
        debug!(path = %path.display(), "loaded .env");
    }

    let config = match config_path {
        Some(path) if path.exists() => load_config(path)?,
        Some(path) => {
            debug!(path = %path.display(), "config file not found; using environment only");
            AppConfig::empty()
        }
        None => AppConfig::empty(),
    };
    let config = apply_env_overrides(config, |key| std::env::var(key).ok())?;
    Ok(resolve_settings(&config)?)
}
