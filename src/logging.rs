//! Structured logging setup.
//!
//! Logging goes through `tracing`. Binaries call [`init_logging`] once at
//! startup; libraries and tests hand an explicit [`Logger`] to the
//! [`Engine`](crate::engine::Engine) instead of relying on a process-wide
//! subscriber.

use anyhow::{Context, Result};
use std::env;
use tracing::{Dispatch, Level, Subscriber};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log format: JSON for production, pretty-print for development
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Json, // Default to JSON
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level: trace/debug/info/warn/error
    pub log_level: String,
    /// Log format: json/pretty
    pub format: LogFormat,
    /// Extra `EnvFilter` directives (comma-separated)
    pub target_filter: Option<String>,
    /// Include file:line location (dev only)
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Json,
            target_filter: None,
            include_location: false,
        }
    }
}

impl LogConfig {
    /// Parse configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            log_level: env::var("TRIEROUTER_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: LogFormat::parse(
                &env::var("TRIEROUTER_LOG_FORMAT").unwrap_or_else(|_| "json".to_string()),
            ),
            target_filter: env::var("TRIEROUTER_LOG_TARGET_FILTER").ok(),
            include_location: env::var("TRIEROUTER_LOG_INCLUDE_LOCATION")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(false),
        }
    }

    /// Create a default configuration for local development
    pub fn default_dev() -> Self {
        Self {
            log_level: "debug".to_string(),
            format: LogFormat::Pretty,
            target_filter: None,
            include_location: true,
        }
    }

    fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    fn env_filter(&self) -> Result<EnvFilter> {
        let mut env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level().as_str()));

        if let Some(target_filter) = &self.target_filter {
            for filter in target_filter.split(',').map(str::trim).filter(|f| !f.is_empty()) {
                let directive = filter
                    .parse::<Directive>()
                    .with_context(|| format!("Invalid log filter directive: {filter}"))?;
                env_filter = env_filter.add_directive(directive);
            }
        }
        Ok(env_filter)
    }
}

/// Build a subscriber for `config` without installing it.
///
/// Events are written to stderr.
pub fn build_dispatch(config: &LogConfig) -> Result<Dispatch> {
    let env_filter = config.env_filter()?;

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer);
    Ok(Dispatch::new(subscriber))
}

/// Install the subscriber for `config` as the process-wide default.
///
/// # Example
///
/// ```no_run
/// use trierouter::logging::{init_logging, LogConfig};
///
/// init_logging(&LogConfig::from_env()).expect("Failed to initialize logging");
/// ```
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let dispatch = build_dispatch(config)?;
    tracing::dispatcher::set_global_default(dispatch).context("Failed to initialize logging")
}

/// Logging dependency handed to an engine at construction.
///
/// With a dispatch, every event the engine (and the handlers it runs) emits
/// goes to that subscriber. [`Logger::inherit`] uses whichever subscriber is
/// current for the calling thread.
#[derive(Clone, Default)]
pub struct Logger {
    dispatch: Option<Dispatch>,
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("injected", &self.dispatch.is_some())
            .finish()
    }
}

impl Logger {
    /// Use the ambient subscriber.
    pub fn inherit() -> Self {
        Self::default()
    }

    pub fn new(dispatch: Dispatch) -> Self {
        Self {
            dispatch: Some(dispatch),
        }
    }

    pub fn from_subscriber<S>(subscriber: S) -> Self
    where
        S: Subscriber + Send + Sync + 'static,
    {
        Self::new(Dispatch::new(subscriber))
    }

    /// Logger writing through the subscriber [`build_dispatch`] makes for `config`.
    ///
    /// # Errors
    ///
    /// Fails when `config.target_filter` holds an invalid directive.
    pub fn from_config(config: &LogConfig) -> Result<Self> {
        build_dispatch(config).map(Self::new)
    }

    /// Run `f` with this logger's subscriber as the default.
    #[inline]
    pub fn scope<T>(&self, f: impl FnOnce() -> T) -> T {
        match &self.dispatch {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, f),
            None => f(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("PRETTY"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("other"), LogFormat::Json);
    }

    #[test]
    fn test_level_parse() {
        let mut config = LogConfig::default();
        assert_eq!(config.level(), Level::INFO);
        config.log_level = "DEBUG".to_string();
        assert_eq!(config.level(), Level::DEBUG);
        config.log_level = "nonsense".to_string();
        assert_eq!(config.level(), Level::INFO);
    }

    #[test]
    fn test_invalid_target_filter_is_an_error() {
        let config = LogConfig {
            target_filter: Some("trierouter=notalevel".to_string()),
            ..LogConfig::default()
        };
        assert!(build_dispatch(&config).is_err());
    }

    #[test]
    fn test_build_dispatch_with_filters() {
        let config = LogConfig {
            target_filter: Some("trierouter=debug, ,hyper=warn".to_string()),
            ..LogConfig::default_dev()
        };
        assert!(build_dispatch(&config).is_ok());
    }

    #[test]
    fn test_logger_from_config() {
        let logger = Logger::from_config(&LogConfig::default_dev()).unwrap();
        assert_eq!(logger.scope(|| 7), 7);
        assert!(format!("{logger:?}").contains("injected: true"));

        let config = LogConfig {
            target_filter: Some("trierouter=notalevel".to_string()),
            ..LogConfig::default()
        };
        assert!(Logger::from_config(&config).is_err());
    }

    #[test]
    fn test_inherited_logger_runs_closure() {
        assert_eq!(Logger::inherit().scope(|| 7), 7);
    }
}
