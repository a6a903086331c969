//! Tracing subscriber setup
//!
//! `RUST_LOG` always wins over the configured level.

use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

use crate::config::Environment;

/// Tracing configuration options
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Fallback level when `RUST_LOG` is unset
    pub level: Level,
    /// One JSON object per event
    pub json: bool,
    /// Emit span open/close events
    pub span_events: bool,
    /// Include file and line numbers
    pub file_line: bool,
    pub thread_names: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json: false,
            span_events: false,
            file_line: true,
            thread_names: false,
        }
    }
}

impl TracingConfig {
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: Level::DEBUG,
            span_events: true,
            thread_names: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn production() -> Self {
        Self {
            json: true,
            file_line: false,
            ..Self::default()
        }
    }

    /// Preset matching the deployment environment
    #[must_use]
    pub fn for_environment(env: Environment) -> Self {
        match env {
            Environment::Development => Self::development(),
            Environment::Staging => Self::default(),
            Environment::Production => Self::production(),
        }
    }

    fn span_events(&self) -> FmtSpan {
        if self.span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }

    fn fmt_layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let layer = fmt::layer()
            .with_file(self.file_line)
            .with_line_number(self.file_line)
            .with_thread_names(self.thread_names)
            .with_span_events(self.span_events());

        if self.json {
            layer.json().boxed()
        } else {
            layer.boxed()
        }
    }
}

/// Install the global subscriber
///
/// # Errors
/// Returns [`TracingError::AlreadyInitialized`] when a subscriber is already set,
/// which tests hit routinely and may ignore
pub fn try_init_tracing(config: &TracingConfig) -> Result<(), TracingError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_string()));

    tracing_subscriber::registry()
        .with(config.fmt_layer())
        .with(env_filter)
        .try_init()
        .map_err(|_| TracingError::AlreadyInitialized)
}

/// Tracing initialization errors
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("Tracing subscriber already initialized")]
    AlreadyInitialized,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let dev = TracingConfig::development();
        assert_eq!(dev.level, Level::DEBUG);
        assert!(dev.span_events);
        assert!(!dev.json);

        let prod = TracingConfig::production();
        assert_eq!(prod.level, Level::INFO);
        assert!(prod.json);
        assert!(!prod.file_line);
    }

    #[test]
    fn test_for_environment() {
        assert!(TracingConfig::for_environment(Environment::Production).json);
        assert_eq!(
            TracingConfig::for_environment(Environment::Development).level,
            Level::DEBUG
        );
    }

    #[test]
    fn test_second_init_reports_error() {
        let config = TracingConfig::default();
        let _ = try_init_tracing(&config);
        assert!(matches!(
            try_init_tracing(&config),
            Err(TracingError::AlreadyInitialized)
        ));
    }
}
