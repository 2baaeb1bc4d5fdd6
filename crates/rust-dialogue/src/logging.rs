//! Subscriber installation for applications embedding the engine.
//!
//! The library itself only emits `tracing` events. Binaries that want them
//! printed can call [`init`] (or [`try_init`]) once at startup.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::{DialogueError, Result};

/// Environment variable checked first for a filter directive.
pub const ENV_FILTER_VAR: &str = "RUST_DIALOGUE_LOG";

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// Newline-delimited JSON.
    Json,
}

/// Subscriber settings.
#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    /// Filter directive used when neither environment variable is set.
    pub default_filter: Option<String>,
    /// Output format.
    pub format: LogFormat,
    /// Whether to print the event target.
    pub with_target: bool,
}

impl LoggingConfig {
    /// Create a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fallback filter directive, e.g. `rust_dialogue=debug`.
    #[must_use]
    pub fn default_filter(mut self, filter: impl Into<String>) -> Self {
        self.default_filter = Some(filter.into());
        self
    }

    /// Set the output format.
    #[must_use]
    pub const fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set whether to print the event target.
    #[must_use]
    pub const fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }

    fn filter(&self) -> Result<EnvFilter> {
        if let Ok(filter) = EnvFilter::try_from_env(ENV_FILTER_VAR) {
            return Ok(filter);
        }
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        let directive = self.default_filter.as_deref().unwrap_or("info");
        EnvFilter::try_new(directive)
            .map_err(|e| DialogueError::config(format!("invalid log filter '{directive}': {e}")))
    }
}

/// Install a global subscriber.
///
/// Fails if a global subscriber is already installed or the filter is
/// malformed.
pub fn try_init(config: &LoggingConfig) -> Result<()> {
    let filter = config.filter()?;
    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(config.with_target))
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(config.with_target),
            )
            .try_init(),
    };
    result.map_err(|e| DialogueError::config(format!("cannot install subscriber: {e}")))
}

/// Install a global subscriber with the given fallback filter, ignoring the
/// error if one is already installed.
pub fn init(default_filter: &str) {
    let config = LoggingConfig::new().default_filter(default_filter);
    if let Err(e) = try_init(&config) {
        tracing::debug!(error = %e, "Subscriber not installed");
    }
}
