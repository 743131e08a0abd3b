//! Counters for render dispatch and settlement.
//!
//! ## Usage
//!
//! ```ignore
//! let snapshot = renderer.metrics().snapshot();
//! tracing::info!(timeouts = snapshot.timeouts, "render health");
//! ```

use crate::error::RenderError;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe render counters.
#[derive(Debug, Default)]
pub struct RenderMetrics {
    /// Render batches accepted by `dispatch`
    pub dispatched: AtomicU64,
    /// Renders acknowledged without an error
    pub succeeded: AtomicU64,
    /// Renders the remote surface reported as failed
    pub remote_failures: AtomicU64,
    /// Renders whose send failed
    pub send_failures: AtomicU64,
    /// Renders that reached their deadline unacknowledged
    pub timeouts: AtomicU64,
    /// Renders whose handle was dropped unsettled
    pub abandoned: AtomicU64,
    /// Acknowledgments for ids no longer (or never) pending
    pub stale_acks: AtomicU64,
    /// Root component attachments that failed to send
    pub attach_failures: AtomicU64,
}

impl RenderMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an accepted dispatch
    pub fn record_dispatch(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an acknowledged render
    pub fn record_success(&self) {
        self.succeeded.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an acknowledgment that matched nothing pending
    pub fn record_stale_ack(&self) {
        self.stale_acks.fetch_add(1, Ordering::Relaxed);
    }

    /// Classify and count a settlement or attachment failure.
    pub fn record_failure(&self, failure: &RenderError) {
        let counter = match failure {
            RenderError::SendFailed { .. } => &self.send_failures,
            RenderError::RemoteFailure { .. } => &self.remote_failures,
            RenderError::Timeout { .. } => &self.timeouts,
            RenderError::Abandoned { .. } => &self.abandoned,
            RenderError::AttachFailed { .. } => &self.attach_failures,
            _ => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a point-in-time copy of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            dispatched: self.dispatched.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            remote_failures: self.remote_failures.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            abandoned: self.abandoned.load(Ordering::Relaxed),
            stale_acks: self.stale_acks.load(Ordering::Relaxed),
            attach_failures: self.attach_failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of `RenderMetrics`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Render batches accepted by `dispatch`
    pub dispatched: u64,
    /// Renders acknowledged without an error
    pub succeeded: u64,
    /// Renders the remote surface reported as failed
    pub remote_failures: u64,
    /// Renders whose send failed
    pub send_failures: u64,
    /// Renders that reached their deadline unacknowledged
    pub timeouts: u64,
    /// Renders whose handle was dropped unsettled
    pub abandoned: u64,
    /// Acknowledgments for ids no longer (or never) pending
    pub stale_acks: u64,
    /// Root component attachments that failed to send
    pub attach_failures: u64,
}

impl MetricsSnapshot {
    /// Renders that settled, by any outcome.
    pub fn settled(&self) -> u64 {
        self.succeeded + self.remote_failures + self.send_failures + self.timeouts + self.abandoned
    }
}
