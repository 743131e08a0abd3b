//! Outbound ports (driven ports).

use crate::domain::RendererId;
use crate::error::TransportError;
use crate::messages::OutboundMessage;
use crate::ports::RenderAcknowledger;
use async_trait::async_trait;
use std::sync::{Arc, Weak};

/// Send primitive of the session transport.
///
/// A returned error means delivery was never attempted; the render it
/// carried is failed immediately instead of waiting for the deadline.
#[async_trait]
pub trait RenderTransport: Send + Sync {
    async fn send(&self, message: OutboundMessage) -> Result<(), TransportError>;
}

/// Maps renderer instances to stable numeric ids.
///
/// The registry holds renderers weakly; dropping the last strong reference
/// to a renderer is enough to make `lookup` return `None`.
pub trait RendererRegistry: Send + Sync {
    fn add(&self, renderer: Weak<dyn RenderAcknowledger>) -> RendererId;

    fn remove(&self, id: RendererId);

    fn lookup(&self, id: RendererId) -> Option<Arc<dyn RenderAcknowledger>>;
}
