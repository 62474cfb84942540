//! # Structured Logging
//!
//! Subscriber setup and span macros built on the tracing ecosystem.

use crate::config::{LogFormat, ObservabilityConfig};
use crate::Result;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Create a tracing span covering the translation of one route
#[macro_export]
macro_rules! translation_span {
    ($route:expr) => {
        tracing::info_span!("route_translation", route = %$route)
    };
    ($route:expr, $($field:tt)*) => {
        tracing::info_span!("route_translation", route = %$route, $($field)*)
    };
}

/// Install the global log subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. A subscriber that
/// is already installed (tests, embedding applications) is left in place.
pub fn init_logging(config: &ObservabilityConfig) -> Result<()> {
    let filter = build_filter(config)?;

    let installed = match config.log_format {
        LogFormat::Text => tracing::subscriber::set_global_default(
            FmtSubscriber::builder().with_env_filter(filter).with_target(false).finish(),
        ),
        LogFormat::Json => tracing::subscriber::set_global_default(
            FmtSubscriber::builder().with_env_filter(filter).json().finish(),
        ),
    };

    if installed.is_err() {
        tracing::debug!("Global subscriber already installed; keeping it");
    }

    Ok(())
}

fn build_filter(config: &ObservabilityConfig) -> Result<EnvFilter> {
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
    }

    EnvFilter::try_new(&config.log_level).map_err(|e| {
        crate::Error::config(format!("Invalid log level '{}': {}", config.log_level, e))
    })
}

/// Log configuration at startup
pub fn log_config_info(config: &ObservabilityConfig) {
    tracing::info!(
        service_name = %config.service_name,
        log_level = %config.log_level,
        log_format = %config.log_format,
        version = crate::VERSION,
        "meshroute configuration"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macros_compile() {
        let _span = translation_span!("ingress");
        let _span = translation_span!("ingress", virtual_hosts = 2);
    }

    // init_logging itself is not called here: #[traced_test] elsewhere in
    // this binary needs to own the global subscriber.
    #[test]
    fn test_filter_from_config() {
        if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
            return;
        }

        let config = ObservabilityConfig { log_level: "debug".into(), ..Default::default() };
        let filter = build_filter(&config).unwrap();
        assert_eq!(filter.to_string(), "debug");
    }

    #[test]
    fn test_log_config_info() {
        log_config_info(&ObservabilityConfig::default());
    }
}
