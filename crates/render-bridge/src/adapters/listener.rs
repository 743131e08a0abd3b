//! Inbound acknowledgment listener.
//!
//! Drains calls from the remote surface and hands each one to a
//! `RenderAcknowledger`. Malformed frames are logged and skipped; they
//! never stop the loop.

use crate::error::TransportError;
use crate::messages::InboundCall;
use crate::ports::RenderAcknowledger;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

pub struct AcknowledgmentListener {
    acknowledger: Arc<dyn RenderAcknowledger>,
}

impl AcknowledgmentListener {
    pub fn new(acknowledger: Arc<dyn RenderAcknowledger>) -> Self {
        Self { acknowledger }
    }

    pub fn handle_call(&self, call: InboundCall) {
        match call {
            InboundCall::OnRenderCompleted {
                render_id,
                error_message,
            } => self.acknowledger.on_render_completed(render_id, error_message),
        }
    }

    /// Decode a JSON frame and handle it.
    pub fn handle_frame(&self, frame: &str) -> Result<(), TransportError> {
        let call = InboundCall::from_json(frame)?;
        self.handle_call(call);
        Ok(())
    }

    /// Run until the inbound channel closes.
    pub async fn run(self, mut calls: mpsc::Receiver<InboundCall>) {
        while let Some(call) = calls.recv().await {
            self.handle_call(call);
        }
        info!("Inbound call channel closed, stopping acknowledgment listener");
    }

    /// Like `run`, for JSON text frames.
    pub async fn run_json(self, mut frames: mpsc::Receiver<String>) {
        while let Some(frame) = frames.recv().await {
            if let Err(e) = self.handle_frame(&frame) {
                warn!(error = %e, "Dropping malformed inbound frame");
            }
        }
        info!("Inbound frame channel closed, stopping acknowledgment listener");
    }
}
