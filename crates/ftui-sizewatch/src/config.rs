#![forbid(unsafe_code)]

//! Observer configuration.
//!
//! Defaults reproduce the reference cadence: a 100 ms poll interval and a
//! clamp floor of 5 units. Both can be overridden in code or from the
//! environment:
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `FTUI_SIZEWATCH_POLL_MS` | poll interval in milliseconds (> 0) |
//! | `FTUI_SIZEWATCH_MIN_SIZE` | clamp floor (≥ 1) |
//!
//! Unparseable or out-of-range values are logged and ignored.

use std::time::Duration;

use tracing::warn;

use crate::dimension::MIN_DIMENSION;

/// Default poll cadence.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

const ENV_POLL_MS: &str = "FTUI_SIZEWATCH_POLL_MS";
const ENV_MIN_SIZE: &str = "FTUI_SIZEWATCH_MIN_SIZE";

/// Configuration for a [`SizeObserver`](crate::SizeObserver).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObserverConfig {
    /// Interval between polling measurements.
    pub poll_interval: Duration,
    /// Clamp floor applied to both dimensions.
    pub min_size: u32,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            min_size: MIN_DIMENSION,
        }
    }
}

impl ObserverConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the clamp floor. Values below 1 are raised to 1 so a recorded
    /// size is never zero.
    #[must_use]
    pub fn with_min_size(mut self, min_size: u32) -> Self {
        self.min_size = min_size.max(1);
        self
    }

    /// Defaults overridden by the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Defaults overridden through a custom environment lookup.
    #[must_use]
    pub fn from_env_with<F>(get_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = get_env(ENV_POLL_MS) {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => config.poll_interval = Duration::from_millis(ms),
                _ => warn!(var = ENV_POLL_MS, value = %raw, "ignoring invalid poll interval"),
            }
        }

        if let Some(raw) = get_env(ENV_MIN_SIZE) {
            match raw.trim().parse::<u32>() {
                Ok(floor) if floor > 0 => config.min_size = floor,
                _ => warn!(var = ENV_MIN_SIZE, value = %raw, "ignoring invalid clamp floor"),
            }
        }

        config
    }
}
