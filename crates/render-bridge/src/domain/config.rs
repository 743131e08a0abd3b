//! Renderer configuration.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `RB_RENDER_TIMEOUT_MS` | `60000` | Deadline for a render acknowledgment |
//! | `RB_MAX_IN_FLIGHT` | unset | Optional cap on concurrently pending renders |

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Default acknowledgment deadline.
pub const DEFAULT_RENDER_TIMEOUT_MS: u64 = 60_000;

/// Per-deployment renderer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Deadline in milliseconds before a render settles as timed out.
    pub render_timeout_ms: u64,
    /// Maximum renders in flight per renderer. `None` means unbounded.
    pub max_in_flight: Option<usize>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            render_timeout_ms: DEFAULT_RENDER_TIMEOUT_MS,
            max_in_flight: None,
        }
    }
}

impl RendererConfig {
    /// Defaults overlaid with `RB_*` environment variables.
    ///
    /// Unparseable values are ignored and the default is kept.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            render_timeout_ms: lookup("RB_RENDER_TIMEOUT_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.render_timeout_ms),
            max_in_flight: lookup("RB_MAX_IN_FLIGHT")
                .and_then(|v| v.parse().ok())
                .or(defaults.max_in_flight),
        }
    }

    /// Reject a zero deadline or a zero in-flight cap.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.render_timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout(
                "render_timeout_ms cannot be 0".into(),
            ));
        }

        if self.max_in_flight == Some(0) {
            return Err(ConfigError::InvalidLimit(
                "max_in_flight cannot be 0".into(),
            ));
        }

        Ok(())
    }

    /// The acknowledgment deadline as a `Duration`.
    pub fn render_timeout(&self) -> Duration {
        Duration::from_millis(self.render_timeout_ms)
    }

    /// Set the deadline. Sub-millisecond durations round up to 1ms and
    /// oversized ones saturate; only `Duration::ZERO` yields 0.
    pub fn with_render_timeout(mut self, timeout: Duration) -> Self {
        let millis = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self.render_timeout_ms = if millis == 0 && !timeout.is_zero() {
            1
        } else {
            millis
        };
        self
    }

    /// Cap the number of renders in flight.
    pub fn with_max_in_flight(mut self, limit: usize) -> Self {
        self.max_in_flight = Some(limit);
        self
    }
}
