//! Configuration DTO.
//!
//! Maps the TOML file onto plain data. Missing keys stay missing: defaults
//! and validation belong to the bootstrap layer, not here.

use std::path::PathBuf;

/// Client configuration as written in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL of the assessment API. May be empty.
    pub api_base_url: String,
    pub request_timeout_secs: Option<u64>,
    pub poll_interval_ms: Option<u64>,
    pub overlay_ceiling_secs: Option<u64>,
    /// Country sent with payment initialization for local pricing.
    pub country_code: Option<String>,
    /// File backing the handoff store. Empty means in-memory.
    pub handoff_path: PathBuf,
    pub log_filter: Option<String>,
}

impl AppConfig {
    pub fn from_toml(toml_value: &toml::Value) -> anyhow::Result<Self> {
        let section = |name: &str, key: &str| toml_value.get(name).and_then(|s| s.get(key));
        let string = |name: &str, key: &str| {
            section(name, key)
                .and_then(|v| v.as_str())
                .map(str::to_string)
        };
        let integer = |name: &str, key: &str| {
            section(name, key)
                .and_then(|v| v.as_integer())
                .and_then(|v| u64::try_from(v).ok())
        };

        Ok(Self {
            api_base_url: string("api", "base_url").unwrap_or_default(),
            request_timeout_secs: integer("api", "request_timeout_secs"),
            poll_interval_ms: integer("evaluations", "poll_interval_ms"),
            overlay_ceiling_secs: integer("evaluations", "overlay_ceiling_secs"),
            country_code: string("payments", "country_code"),
            handoff_path: PathBuf::from(string("handoff", "path").unwrap_or_default()),
            log_filter: string("logging", "filter"),
        })
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toml::Value;

    #[test]
    fn test_from_toml_reads_every_section() {
        let toml_str = r#"
            [api]
            base_url = "https://api.grantwise.test"
            request_timeout_secs = 10

            [evaluations]
            poll_interval_ms = 500
            overlay_ceiling_secs = 5

            [payments]
            country_code = "NG"

            [handoff]
            path = "/tmp/handoff.json"

            [logging]
            filter = "gw_app=trace"
        "#;
        let toml_value: Value = toml::from_str(toml_str).unwrap();

        let config = AppConfig::from_toml(&toml_value).unwrap();

        assert_eq!(config.api_base_url, "https://api.grantwise.test");
        assert_eq!(config.request_timeout_secs, Some(10));
        assert_eq!(config.poll_interval_ms, Some(500));
        assert_eq!(config.overlay_ceiling_secs, Some(5));
        assert_eq!(config.country_code.as_deref(), Some("NG"));
        assert_eq!(config.handoff_path, PathBuf::from("/tmp/handoff.json"));
        assert_eq!(config.log_filter.as_deref(), Some("gw_app=trace"));
    }

    #[test]
    fn test_from_toml_leaves_missing_keys_empty() {
        let toml_value: Value = toml::from_str("[api]").unwrap();

        let config = AppConfig::from_toml(&toml_value).unwrap();

        assert_eq!(config, AppConfig::empty());
    }

    #[test]
    fn test_from_toml_ignores_negative_numbers() {
        let toml_value: Value = toml::from_str("[evaluations]\npoll_interval_ms = -1").unwrap();

        let config = AppConfig::from_toml(&toml_value).unwrap();

        assert_eq!(config.poll_interval_ms, None);
    }
}
