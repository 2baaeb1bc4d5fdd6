//! Configuration types for rust-dialogue.
//!
//! [`FlowConfig`] controls the pacing of a conversation (typing speed,
//! inter-turn delay), where it starts, and whether it advances on its own.
//! It can be built fluently, deserialized from TOML/JSON (see [`file`]) and
//! overlaid from environment variables (see [`env`]).

pub mod env;
pub mod file;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DialogueError, Result};

/// Default typing speed.
pub const DEFAULT_SPEED: f64 = 5.0;

/// Lowest accepted typing speed; lower values are clamped up to it.
pub const MIN_SPEED: f64 = 1.0;

/// Default fixed inter-turn delay.
pub const DEFAULT_DELAY: Duration = Duration::ZERO;

/// Configuration for a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FlowConfig {
    /// Typing speed, nominally 1-10. Higher is faster.
    pub speed: f64,

    /// Fixed delay between automatic advances.
    #[serde(with = "millis")]
    pub delay: Duration,

    /// Inclusive millisecond range for a random inter-turn delay. Overrides
    /// `delay` when both bounds are positive and `lo <= hi`.
    pub delay_min_max: Option<(u64, u64)>,

    /// Whether the typing wait depends on text length. When false the wait
    /// is always zero.
    pub character_dependent_wait: bool,

    /// Node to start from when `init` is called without an explicit id.
    /// Also read from the older `firstQuestion` key.
    #[serde(alias = "firstQuestion")]
    pub first_message: Option<String>,

    /// Whether messages advance on their own. When false the caller drives
    /// progression with `next`.
    pub auto_next: bool,

    /// Seed for the delay RNG, for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            speed: DEFAULT_SPEED,
            delay: DEFAULT_DELAY,
            delay_min_max: None,
            character_dependent_wait: true,
            first_message: None,
            auto_next: true,
            seed: None,
        }
    }
}

impl FlowConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the typing speed.
    #[must_use]
    pub const fn speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    /// Set the fixed inter-turn delay.
    #[must_use]
    pub const fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Set the fixed inter-turn delay in milliseconds.
    #[must_use]
    pub const fn delay_ms(mut self, ms: u64) -> Self {
        self.delay = Duration::from_millis(ms);
        self
    }

    /// Set an inclusive random delay range in milliseconds.
    #[must_use]
    pub const fn delay_min_max(mut self, lo: u64, hi: u64) -> Self {
        self.delay_min_max = Some((lo, hi));
        self
    }

    /// Set whether the typing wait depends on text length.
    #[must_use]
    pub const fn character_dependent_wait(mut self, enabled: bool) -> Self {
        self.character_dependent_wait = enabled;
        self
    }

    /// Set the node to start from.
    #[must_use]
    pub fn first_message(mut self, id: impl Into<String>) -> Self {
        self.first_message = Some(id.into());
        self
    }

    /// Set whether messages advance automatically.
    #[must_use]
    pub const fn auto_next(mut self, enabled: bool) -> Self {
        self.auto_next = enabled;
        self
    }

    /// Seed the delay RNG.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// The speed actually used for timing, clamped to [`MIN_SPEED`].
    #[must_use]
    pub fn effective_speed(&self) -> f64 {
        if self.speed.is_nan() {
            DEFAULT_SPEED
        } else {
            self.speed.max(MIN_SPEED)
        }
    }

    /// The random delay range, if it is usable.
    #[must_use]
    pub fn random_delay_range(&self) -> Option<(u64, u64)> {
        self.delay_min_max
            .filter(|&(lo, hi)| lo > 0 && hi > 0 && lo <= hi)
    }

    /// Check the configuration for values that cannot drive a conversation.
    pub fn validate(&self) -> Result<()> {
        if !self.speed.is_finite() {
            return Err(DialogueError::config(format!(
                "speed must be a finite number, got {}",
                self.speed
            )));
        }
        if let Some(first) = &self.first_message {
            if first.is_empty() {
                return Err(DialogueError::config("firstMessage must not be empty"));
            }
        }
        Ok(())
    }
}

/// Serde adapter storing a [`Duration`] as whole milliseconds.
mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
