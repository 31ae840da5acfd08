//! Configuration for the applet runtime and CLI.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppletError, AppletResult};

/// Applet configuration — typically stored at `~/.adaptive-applet/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppletConfig {
    /// Channel invoke endpoint (or read from APPLET_CHANNEL_URL).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_url: Option<String>,

    /// Bearer token for the channel (or read from APPLET_AUTH_TOKEN).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,

    /// Identity of the current user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Retry behaviour of invocations.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Size of the login popup.
    #[serde(default)]
    pub auth_prompt: AuthPromptConfig,

    /// Telemetry configuration.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppletConfig {
    /// Default config file location.
    pub fn default_path() -> Option<PathBuf> {
        dirs_next::home_dir().map(|home| home.join(".adaptive-applet").join("config.toml"))
    }

    /// Load the default config file (if any), then apply environment overrides.
    pub fn load() -> AppletResult<Self> {
        let config = match Self::default_path() {
            Some(path) if path.exists() => Self::from_path(&path)?,
            _ => Self::default(),
        };
        let config = config.with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Read a config file.
    pub fn from_path(path: &Path) -> AppletResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| AppletError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&raw)
    }

    /// Parse config from TOML text.
    pub fn from_toml(raw: &str) -> AppletResult<Self> {
        toml::from_str(raw).map_err(|e| AppletError::Config(e.to_string()))
    }

    /// Apply `APPLET_CHANNEL_URL`, `APPLET_AUTH_TOKEN` and `APPLET_USER_ID`.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("APPLET_CHANNEL_URL") {
            self.channel_url = Some(url);
        }
        if let Ok(token) = std::env::var("APPLET_AUTH_TOKEN") {
            self.auth_token = Some(token);
        }
        if let Ok(user) = std::env::var("APPLET_USER_ID") {
            self.user_id = Some(user);
        }
        self
    }

    /// Reject values the runtime cannot honour.
    pub fn validate(&self) -> AppletResult<()> {
        if self.retry.maximum_request_attempts == 0 {
            return Err(AppletError::Config(
                "retry.maximum_request_attempts must be at least 1".into(),
            ));
        }
        if self.auth_prompt.width == 0 || self.auth_prompt.height == 0 {
            return Err(AppletError::Config(
                "auth_prompt width and height must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Retry behaviour for failed invocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Upper bound on sends per invocation, first attempt included.
    #[serde(default = "default_maximum_request_attempts")]
    pub maximum_request_attempts: u32,

    /// Delay between attempts when no hook picks one.
    #[serde(default = "default_retry_delay_ms")]
    pub default_retry_delay_ms: u64,
}

impl RetryConfig {
    pub fn default_retry_delay(&self) -> Duration {
        Duration::from_millis(self.default_retry_delay_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            maximum_request_attempts: default_maximum_request_attempts(),
            default_retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

fn default_maximum_request_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    3000
}

/// Login popup dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthPromptConfig {
    #[serde(default = "default_prompt_width")]
    pub width: u32,

    #[serde(default = "default_prompt_height")]
    pub height: u32,
}

impl Default for AuthPromptConfig {
    fn default() -> Self {
        Self {
            width: default_prompt_width(),
            height: default_prompt_height(),
        }
    }
}

fn default_prompt_width() -> u32 {
    400
}

fn default_prompt_height() -> u32 {
    600
}

/// Telemetry/observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Whether to export traces.
    #[serde(default)]
    pub enabled: bool,

    /// OTLP exporter endpoint.
    #[serde(default = "default_otlp_endpoint")]
    pub otlp_endpoint: String,

    /// Log line format.
    #[serde(default)]
    pub log_format: LogFormat,

    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            otlp_endpoint: default_otlp_endpoint(),
            log_format: LogFormat::default(),
            filter: None,
        }
    }
}

/// How log lines are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line.
    Json,
    /// Compact human-readable lines.
    #[default]
    Pretty,
}

fn default_otlp_endpoint() -> String {
    "http://localhost:4317".into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppletConfig::default();
        assert_eq!(config.retry.maximum_request_attempts, 3);
        assert_eq!(config.retry.default_retry_delay(), Duration::from_secs(3));
        assert_eq!(config.auth_prompt, AuthPromptConfig { width: 400, height: 600 });
        assert!(!config.telemetry.enabled);
        assert_eq!(config.telemetry.log_format, LogFormat::Pretty);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = AppletConfig::from_toml(
            r#"
            channel_url = "https://bot.example.com/invoke"

            [retry]
            maximum_request_attempts = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.channel_url.as_deref(), Some("https://bot.example.com/invoke"));
        assert_eq!(config.retry.maximum_request_attempts, 5);
        assert_eq!(config.retry.default_retry_delay_ms, 3000);
        assert_eq!(config.auth_prompt.width, 400);
    }

    #[test]
    fn test_validation() {
        let config = AppletConfig::from_toml("[retry]\nmaximum_request_attempts = 0").unwrap();
        assert!(matches!(config.validate(), Err(AppletError::Config(_))));

        let config = AppletConfig::from_toml("[auth_prompt]\nwidth = 0").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            AppletConfig::from_toml("retry = 12"),
            Err(AppletError::Config(_))
        ));
    }
}
