//! In-process transports over tokio mpsc channels.

use crate::error::TransportError;
use crate::messages::OutboundMessage;
use crate::ports::RenderTransport;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::trace;

/// Sends typed frames to a channel. Fails once the receiver is dropped.
pub struct ChannelTransport(pub mpsc::Sender<OutboundMessage>);

impl ChannelTransport {
    /// Create a transport and the receiving end the remote side reads.
    pub fn pair(buffer: usize) -> (Self, mpsc::Receiver<OutboundMessage>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self(tx), rx)
    }
}

#[async_trait]
impl RenderTransport for ChannelTransport {
    async fn send(&self, message: OutboundMessage) -> Result<(), TransportError> {
        trace!(
            method = message.method(),
            renderer_id = %message.renderer_id(),
            "Sending frame"
        );
        self.0
            .send(message)
            .await
            .map_err(|_| TransportError::ChannelClosed)
    }
}

/// Sends JSON-encoded frames to a channel.
pub struct JsonChannelTransport(pub mpsc::Sender<String>);

impl JsonChannelTransport {
    pub fn pair(buffer: usize) -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self(tx), rx)
    }
}

#[async_trait]
impl RenderTransport for JsonChannelTransport {
    async fn send(&self, message: OutboundMessage) -> Result<(), TransportError> {
        let frame = message.to_json()?;
        trace!(
            method = message.method(),
            renderer_id = %message.renderer_id(),
            bytes = frame.len(),
            "Sending JSON frame"
        );
        self.0
            .send(frame)
            .await
            .map_err(|_| TransportError::ChannelClosed)
    }
}
