//! Error types for the render bridge.
//!
//! Every failure a dispatched render can settle with is a `RenderError`.
//! The same value is delivered to the dispatch caller and to the exception
//! sink, so it is `Clone`.

use crate::domain::{RenderId, RendererId};
use std::time::Duration;
use thiserror::Error;

/// Failures of the outbound send primitive.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("transport channel closed")]
    ChannelClosed,

    #[error("send failed: {0}")]
    SendFailed(String),

    #[error("encode failed: {0}")]
    Encode(String),
}

/// Settlement failures and dispatch preconditions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The send primitive failed before any acknowledgment was possible.
    #[error("render {render_id} could not be sent: {source}")]
    SendFailed {
        render_id: RenderId,
        #[source]
        source: TransportError,
    },

    /// The remote surface reported that applying the batch failed.
    #[error("render {render_id} failed on the remote surface: {message}")]
    RemoteFailure { render_id: RenderId, message: String },

    /// No acknowledgment arrived before the deadline.
    #[error("render {render_id} timed out after {}ms", .after.as_millis())]
    Timeout { render_id: RenderId, after: Duration },

    /// The handle was dropped while still pending.
    #[error("render {render_id} was abandoned before it settled")]
    Abandoned { render_id: RenderId },

    /// A fire-and-forget root component attachment failed to send.
    #[error("attaching component {component_id} to '{selector}' failed: {source}")]
    AttachFailed {
        component_id: u32,
        selector: String,
        #[source]
        source: TransportError,
    },

    #[error("invalid render batch: {0}")]
    InvalidBatch(String),

    #[error("invalid selector: {0}")]
    InvalidSelector(String),

    #[error("renderer {renderer_id} has been disposed")]
    Disposed { renderer_id: RendererId },

    #[error("too many renders in flight (limit {limit})")]
    TooManyInFlight { limit: usize },
}

impl RenderError {
    /// True for the distinguished timeout failure.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// The render this failure settled, if it belongs to one.
    pub fn render_id(&self) -> Option<RenderId> {
        match self {
            Self::SendFailed { render_id, .. }
            | Self::RemoteFailure { render_id, .. }
            | Self::Timeout { render_id, .. }
            | Self::Abandoned { render_id } => Some(*render_id),
            _ => None,
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid render timeout: {0}")]
    InvalidTimeout(String),

    #[error("invalid in-flight limit: {0}")]
    InvalidLimit(String),
}
