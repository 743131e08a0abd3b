//! Shared fixtures for render bridge integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use render_bridge::{
    InMemoryRendererRegistry, OutboundMessage, RemoteRenderer, RenderError, RenderTransport,
    RendererConfig, TransportError,
};
use std::collections::HashSet;
use std::sync::Arc;

/// Transport that records frames and fails sends for chosen render ids.
#[derive(Default)]
pub struct ScriptedTransport {
    failing: Mutex<HashSet<u64>>,
    sent: Mutex<Vec<OutboundMessage>>,
}

impl ScriptedTransport {
    pub fn fail_render(&self, render_id: u64) {
        self.failing.lock().insert(render_id);
    }

    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl RenderTransport for ScriptedTransport {
    async fn send(&self, message: OutboundMessage) -> Result<(), TransportError> {
        if let OutboundMessage::RenderBatch(frame) = &message {
            if self.failing.lock().contains(&frame.render_id.get()) {
                return Err(TransportError::SendFailed("injected".into()));
            }
        }
        self.sent.lock().push(message);
        Ok(())
    }
}

/// Transport whose `send` never completes.
#[derive(Default)]
pub struct PendingTransport;

#[async_trait]
impl RenderTransport for PendingTransport {
    async fn send(&self, _message: OutboundMessage) -> Result<(), TransportError> {
        std::future::pending().await
    }
}

/// Failures observed through the exception sink.
pub type SinkLog = Arc<Mutex<Vec<RenderError>>>;

pub fn renderer_with(
    config: RendererConfig,
    transport: Arc<dyn RenderTransport>,
) -> (Arc<RemoteRenderer>, SinkLog) {
    let registry = Arc::new(InMemoryRendererRegistry::new());
    let renderer = RemoteRenderer::new(config, transport, registry).unwrap();

    let log: SinkLog = Arc::new(Mutex::new(Vec::new()));
    let sink_log = log.clone();
    renderer.subscribe_unhandled_failures(move |err| sink_log.lock().push(err.clone()));

    (renderer, log)
}
