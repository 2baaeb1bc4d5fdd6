//! Environment-based configuration.

use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

use super::FlowConfig;
use crate::error::{DialogueError, Result};

/// Environment configuration prefix.
pub const DEFAULT_PREFIX: &str = "DIALOGUE";

/// Recognised variable names (without prefix).
pub mod vars {
    /// Typing speed.
    pub const SPEED: &str = "SPEED";
    /// Fixed inter-turn delay in milliseconds.
    pub const DELAY: &str = "DELAY";
    /// Lower bound of the random delay range in milliseconds.
    pub const DELAY_MIN: &str = "DELAY_MIN";
    /// Upper bound of the random delay range in milliseconds.
    pub const DELAY_MAX: &str = "DELAY_MAX";
    /// Whether typing wait depends on text length.
    pub const CHARACTER_DEPENDENT_WAIT: &str = "CHARACTER_DEPENDENT_WAIT";
    /// Start node id.
    pub const FIRST_MESSAGE: &str = "FIRST_MESSAGE";
    /// Automatic advancement.
    pub const AUTO_NEXT: &str = "AUTO_NEXT";
    /// Delay RNG seed.
    pub const SEED: &str = "SEED";
}

/// Environment variable reader.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    /// Prefix for environment variables.
    prefix: String,
    /// Fixed values used instead of the process environment.
    source: Option<HashMap<String, String>>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl EnvConfig {
    /// Create a new environment config reader.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            source: None,
        }
    }

    /// Create without a prefix.
    #[must_use]
    pub fn no_prefix() -> Self {
        Self::new(String::new())
    }

    /// Read from a fixed set of variables instead of the process environment.
    ///
    /// Keys are full variable names, prefix included.
    #[must_use]
    pub fn with_source<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.source = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Build the full environment variable name.
    fn var_name(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_uppercase()
        } else {
            format!("{}_{}", self.prefix, name.to_uppercase())
        }
    }

    /// Get a string value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        let var_name = self.var_name(name);
        match &self.source {
            Some(source) => source.get(&var_name).cloned(),
            None => std::env::var(&var_name).ok(),
        }
    }

    /// Get a parsed value, failing on values that do not parse.
    pub fn parse<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(name)
            .map(|raw| {
                raw.trim().parse().map_err(|e| {
                    DialogueError::config(format!("{}={raw:?}: {e}", self.var_name(name)))
                })
            })
            .transpose()
    }

    /// Get a boolean value.
    pub fn bool(&self, name: &str) -> Result<Option<bool>> {
        self.get(name)
            .map(|v| match v.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" | "enabled" => Ok(true),
                "0" | "false" | "no" | "off" | "disabled" => Ok(false),
                _ => Err(DialogueError::config(format!(
                    "{}={v:?} is not a boolean",
                    self.var_name(name)
                ))),
            })
            .transpose()
    }

    /// Get a duration in milliseconds.
    pub fn duration_millis(&self, name: &str) -> Result<Option<Duration>> {
        Ok(self.parse::<u64>(name)?.map(Duration::from_millis))
    }

    /// Overlay every variable that is set onto `config`.
    pub fn apply(&self, mut config: FlowConfig) -> Result<FlowConfig> {
        if let Some(speed) = self.parse::<f64>(vars::SPEED)? {
            config.speed = speed;
        }
        if let Some(delay) = self.duration_millis(vars::DELAY)? {
            config.delay = delay;
        }
        match (
            self.parse::<u64>(vars::DELAY_MIN)?,
            self.parse::<u64>(vars::DELAY_MAX)?,
        ) {
            (Some(lo), Some(hi)) => config.delay_min_max = Some((lo, hi)),
            (None, None) => {}
            _ => {
                return Err(DialogueError::config(format!(
                    "{} and {} must be set together",
                    self.var_name(vars::DELAY_MIN),
                    self.var_name(vars::DELAY_MAX)
                )));
            }
        }
        if let Some(enabled) = self.bool(vars::CHARACTER_DEPENDENT_WAIT)? {
            config.character_dependent_wait = enabled;
        }
        if let Some(first) = self.get(vars::FIRST_MESSAGE) {
            config.first_message = Some(first);
        }
        if let Some(enabled) = self.bool(vars::AUTO_NEXT)? {
            config.auto_next = enabled;
        }
        if let Some(seed) = self.parse::<u64>(vars::SEED)? {
            config.seed = Some(seed);
        }

        debug!(prefix = %self.prefix, ?config, "Applied environment overrides");
        config.validate()?;
        Ok(config)
    }
}
