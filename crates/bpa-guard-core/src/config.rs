//! Configuration management for the BPA Guard handler.
//!
//! All configuration is driven by environment variables set on the Lambda
//! function. AWS endpoint and credential settings are left to `aws-config`.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line (CloudWatch Logs Insights friendly).
    #[default]
    Json,
    /// Human-readable text.
    Text,
}

impl LogFormat {
    /// Parse a format name, falling back to JSON for anything unrecognised.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("text") {
            Self::Text
        } else {
            Self::Json
        }
    }
}

/// Handler configuration.
///
/// # Examples
///
/// ```
/// use bpa_guard_core::{BpaConfig, LogFormat};
///
/// let config = BpaConfig::default();
/// assert_eq!(config.log_level, "info");
/// assert_eq!(config.log_format, LogFormat::Json);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct BpaConfig {
    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,

    /// Log output format.
    #[builder(default)]
    pub log_format: LogFormat,

    /// Timeout, in seconds, for the response PUT to CloudFormation.
    #[builder(default = 30)]
    pub callback_timeout_secs: u64,
}

impl Default for BpaConfig {
    fn default() -> Self {
        Self {
            log_level: String::from("info"),
            log_format: LogFormat::Json,
            callback_timeout_secs: 30,
        }
    }
}

impl BpaConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `LOG_LEVEL` | `info` |
    /// | `LOG_FORMAT` | `json` |
    /// | `CALLBACK_TIMEOUT_SECS` | `30` |
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("LOG_LEVEL") {
            config.log_level = v;
        }
        if let Ok(v) = std::env::var("LOG_FORMAT") {
            config.log_format = LogFormat::parse(&v);
        }
        if let Ok(v) = std::env::var("CALLBACK_TIMEOUT_SECS") {
            if let Ok(n) = v.parse::<u64>() {
                config.callback_timeout_secs = n;
            }
        }

        config
    }
}
