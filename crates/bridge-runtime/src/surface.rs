//! Loopback remote surface.
//!
//! Stands in for the browser side of the bridge: decodes outbound JSON
//! frames, "applies" render batches and answers with `OnRenderCompleted`
//! calls. Failures and dropped acknowledgments are injected by render id
//! so a demo session exercises every settlement path.

use bridge_telemetry::{log_render_event, log_renderer_event};
use render_bridge::{InboundCall, OutboundMessage, RenderId};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Which renders the surface fails or ignores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceBehavior {
    /// Fail every Nth render. 0 disables.
    pub reject_every: u64,
    /// Never acknowledge every Nth render. 0 disables. Wins over rejection.
    pub drop_every: u64,
    pub ack_delay: Duration,
}

impl Default for SurfaceBehavior {
    fn default() -> Self {
        Self {
            reject_every: 4,
            drop_every: 0,
            ack_delay: Duration::from_millis(5),
        }
    }
}

/// What the surface does with one render batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceReply {
    Ack,
    Reject(String),
    Drop,
}

impl SurfaceBehavior {
    pub fn reply_for(&self, render_id: RenderId) -> SurfaceReply {
        let n = render_id.get();
        if self.drop_every != 0 && n % self.drop_every == 0 {
            SurfaceReply::Drop
        } else if self.reject_every != 0 && n % self.reject_every == 0 {
            SurfaceReply::Reject(format!("surface could not apply render {render_id}"))
        } else {
            SurfaceReply::Ack
        }
    }
}

pub struct LoopbackSurface {
    behavior: SurfaceBehavior,
}

impl LoopbackSurface {
    pub fn new(behavior: SurfaceBehavior) -> Self {
        Self { behavior }
    }

    /// Run until the outbound frame channel closes.
    pub async fn run(self, mut frames: mpsc::Receiver<String>, acks: mpsc::Sender<String>) {
        while let Some(text) = frames.recv().await {
            let message = match OutboundMessage::from_json(&text) {
                Ok(message) => message,
                Err(e) => {
                    warn!(error = %e, "Surface received malformed frame");
                    continue;
                }
            };

            match message {
                OutboundMessage::AttachRootComponentToElement(frame) => log_renderer_event!(
                    info,
                    "Surface attached root component",
                    frame.renderer_id,
                    component_id = frame.component_id,
                    selector = %frame.selector
                ),
                OutboundMessage::RenderBatch(frame) => {
                    let error_message = match self.behavior.reply_for(frame.render_id) {
                        SurfaceReply::Ack => None,
                        SurfaceReply::Reject(message) => Some(message),
                        SurfaceReply::Drop => {
                            log_render_event!(
                                debug,
                                "Surface dropping acknowledgment",
                                frame.renderer_id,
                                frame.render_id
                            );
                            continue;
                        }
                    };
                    let call = InboundCall::render_completed(frame.render_id, error_message);
                    self.reply(call, acks.clone());
                }
            }
        }
        info!("Outbound frame channel closed, stopping loopback surface");
    }

    fn reply(&self, call: InboundCall, acks: mpsc::Sender<String>) {
        let frame = match call.to_json() {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "Surface failed to encode acknowledgment");
                return;
            }
        };
        let delay = self.behavior.ack_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The listener is gone once the session shuts down.
            let _ = acks.send(frame).await;
        });
    }
}
