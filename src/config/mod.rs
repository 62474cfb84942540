//! # Configuration Management
//!
//! Environment-driven configuration for the meshroute translator. Only the
//! ambient concerns live here; the routes and cluster catalog to translate
//! are loaded from a snapshot file (see [`crate::domain::MeshSnapshot`]).

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

pub const ENV_LOG_LEVEL: &str = "MESHROUTE_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "MESHROUTE_LOG_FORMAT";
pub const ENV_SERVICE_NAME: &str = "MESHROUTE_SERVICE_NAME";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub observability: ObservabilityConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    pub log_format: LogFormat,

    /// Service name attached to startup logs
    pub service_name: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            service_name: crate::APP_NAME.to_string(),
        }
    }
}

/// Output format of the log subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(Error::config(format!(
                "Invalid log format '{}': expected 'text' or 'json'",
                other
            ))),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Text => f.write_str("text"),
            LogFormat::Json => f.write_str("json"),
        }
    }
}

impl ObservabilityConfig {
    /// Override the log level, rejecting unknown levels
    pub fn with_log_level(mut self, level: &str) -> Result<Self> {
        self.log_level = parse_log_level(level)?;
        Ok(self)
    }

    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.log_format = format;
        self
    }
}

impl Config {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ObservabilityConfig::default();

        let log_level = match lookup(ENV_LOG_LEVEL) {
            Some(level) => parse_log_level(&level)?,
            None => defaults.log_level,
        };

        let log_format = match lookup(ENV_LOG_FORMAT) {
            Some(format) => format.parse()?,
            None => defaults.log_format,
        };

        let service_name = lookup(ENV_SERVICE_NAME).unwrap_or(defaults.service_name);
        if service_name.trim().is_empty() {
            return Err(Error::config("Service name cannot be empty"));
        }

        Ok(Self { observability: ObservabilityConfig { log_level, log_format, service_name } })
    }
}

fn parse_log_level(level: &str) -> Result<String> {
    let level = level.trim().to_ascii_lowercase();
    if LOG_LEVELS.contains(&level.as_str()) {
        Ok(level)
    } else {
        Err(Error::config(format!(
            "Invalid log level '{}': expected one of {}",
            level,
            LOG_LEVELS.join(", ")
        )))
    }
}
