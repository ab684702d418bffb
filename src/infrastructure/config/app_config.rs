//! Application configuration.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use super::args::CliArgs;
use super::storage::ConfigError;
use crate::domain::entities::LecturerEmail;

pub(crate) const APP_NAME: &str = "rollcall";
pub(crate) const APP_QUALIFIER: &str = "com";
pub(crate) const APP_ORGANIZATION: &str = "rollcall";

const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_FEEDBACK_TIMEOUT_SECS: u64 = 30;

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration.
#[derive(Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path. Logs go to stderr when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Base URL of the HTTP API.
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Base URL of the event channel. Falls back to `backend_url`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_url: Option<String>,

    /// Email identifying the lecturer whose courses are shown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lecturer_email: Option<String>,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// How long an emitted action waits for its feedback event, in seconds.
    #[serde(default = "default_feedback_timeout_secs")]
    pub feedback_timeout_secs: u64,

    /// Event channel configuration.
    #[serde(default)]
    pub channel: ChannelConfig,
}

/// Event channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Reconnect after the connection drops.
    #[serde(default = "default_true")]
    pub auto_reconnect: bool,

    /// Reconnect attempts before giving up. Unlimited when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_reconnect_attempts: Option<u32>,

    /// Add a `requestId` to every emitted payload. Only useful with a
    /// backend that echoes it in its feedback.
    #[serde(default)]
    pub tag_requests: bool,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            auto_reconnect: true,
            max_reconnect_attempts: None,
            tag_requests: false,
        }
    }
}

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

const fn default_feedback_timeout_secs() -> u64 {
    DEFAULT_FEEDBACK_TIMEOUT_SECS
}

const fn default_true() -> bool {
    true
}

impl AppConfig {
    /// Merges CLI arguments into the configuration and validates the result.
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` if a timeout ends up as zero.
    pub fn merge_with_args(&mut self, args: &CliArgs) -> Result<(), ConfigError> {
        if let Some(config_path) = &args.config {
            self.config = Some(config_path.clone());
        }
        if let Some(log_path) = &args.log_path {
            self.log_path = Some(log_path.clone());
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(backend_url) = &args.backend_url {
            self.backend_url.clone_from(backend_url);
        }
        if let Some(channel_url) = &args.channel_url {
            self.channel_url = Some(channel_url.clone());
        }
        if let Some(lecturer) = &args.lecturer {
            self.lecturer_email = Some(lecturer.clone());
        }
        if let Some(timeout) = args.feedback_timeout_secs {
            self.feedback_timeout_secs = timeout;
        }
        self.validate()
    }

    /// Checks values the file format alone cannot rule out.
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, secs) in [
            ("request_timeout_secs", self.request_timeout_secs),
            ("feedback_timeout_secs", self.feedback_timeout_secs),
        ] {
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    key,
                    message: "must be at least 1 second".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Returns the parsed HTTP base URL.
    ///
    /// # Errors
    /// Returns error if the URL is malformed or not http(s).
    pub fn backend_base_url(&self) -> Result<Url, ConfigError> {
        parse_base_url("backend_url", &self.backend_url)
    }

    /// Returns the parsed event channel base URL.
    ///
    /// # Errors
    /// Returns error if the URL is malformed or not http(s).
    pub fn channel_base_url(&self) -> Result<Url, ConfigError> {
        match &self.channel_url {
            Some(url) => parse_base_url("channel_url", url),
            None => self.backend_base_url(),
        }
    }

    /// Returns the configured lecturer.
    ///
    /// # Errors
    /// Returns error if no lecturer is configured or the address is invalid.
    pub fn lecturer(&self) -> Result<LecturerEmail, ConfigError> {
        let raw = self
            .lecturer_email
            .as_deref()
            .ok_or(ConfigError::Missing {
                key: "lecturer_email",
            })?;

        LecturerEmail::parse(raw).map_err(|e| ConfigError::Invalid {
            key: "lecturer_email",
            message: e.to_string(),
        })
    }

    /// Timeout of one HTTP request.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// How long an emitted action waits for feedback.
    #[must_use]
    pub const fn feedback_timeout(&self) -> Duration {
        Duration::from_secs(self.feedback_timeout_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config: None,
            log_path: None,
            log_level: LogLevel::Info,
            backend_url: default_backend_url(),
            channel_url: None,
            lecturer_email: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            feedback_timeout_secs: DEFAULT_FEEDBACK_TIMEOUT_SECS,
            channel: ChannelConfig::default(),
        }
    }
}

fn parse_base_url(key: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::Invalid {
        key,
        message: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Invalid {
            key,
            message: format!("unsupported scheme '{other}'"),
        }),
    }
}
