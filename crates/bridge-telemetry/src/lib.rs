//! # Bridge Telemetry
//!
//! Logging initialisation for render bridge processes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bridge_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_logging(&TelemetryConfig::from_env())?;
//!     tracing::info!("ready");
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `RB_SERVICE_NAME` | `render-bridge` | Service name attached to startup logs |
//! | `RB_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `RB_JSON_LOGS` | `false` (`true` in containers) | JSON formatted output |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::init_logging;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },

    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),
}

/// Log a render lifecycle event with standard fields.
///
/// ```rust,ignore
/// log_render_event!(debug, "Render acknowledged", renderer_id, render_id, elapsed_ms = 12);
/// ```
#[macro_export]
macro_rules! log_render_event {
    ($level:ident, $msg:expr, $renderer_id:expr, $render_id:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            renderer_id = %$renderer_id,
            render_id = %$render_id,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a renderer-level event (registration, disposal, attachment).
#[macro_export]
macro_rules! log_renderer_event {
    ($level:ident, $msg:expr, $renderer_id:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            renderer_id = %$renderer_id,
            $($($field)*,)?
            $msg
        )
    };
}
