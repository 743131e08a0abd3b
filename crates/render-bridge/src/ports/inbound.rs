//! Inbound ports (driving ports).

use crate::domain::RenderId;

/// Receives render acknowledgments from the remote surface.
///
/// Implementations must treat an unknown `render_id` as a silent no-op:
/// duplicate and late acknowledgments are an expected race.
pub trait RenderAcknowledger: Send + Sync {
    /// `None` (or an empty message) reports success; anything else is the
    /// remote surface's failure detail.
    fn on_render_completed(&self, render_id: RenderId, error_message: Option<String>);
}
