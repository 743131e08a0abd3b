//! Demo session: one renderer wired to a loopback surface.
//!
//! ```text
//! RemoteRenderer ──JsonChannelTransport──> LoopbackSurface
//!       ▲                                        │
//!       └──── AcknowledgmentListener <── acks ───┘
//! ```
//!
//! Unhandled failures reach the session through the renderer's exception
//! sink. With `teardown_on_failure` set, the first one stops the demo.

use crate::config::RuntimeConfig;
use crate::error::RuntimeError;
use crate::surface::LoopbackSurface;
use bridge_telemetry::log_renderer_event;
use render_bridge::{
    AcknowledgmentListener, InMemoryRendererRegistry, JsonChannelTransport, MetricsSnapshot,
    RemoteRenderer, RenderBatch, RenderError,
};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

const FRAME_BUFFER: usize = 256;
const ROOT_COMPONENT_ID: u32 = 1;

/// Outcome counts for the renders of one demo run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionReport {
    /// Renders acknowledged without an error
    pub acknowledged: usize,
    /// Renders the surface rejected
    pub remote_failures: usize,
    /// Renders the surface never acknowledged
    pub timeouts: usize,
    /// Renders that could not be sent
    pub send_failures: usize,
    /// Any other settlement failure
    pub other_failures: usize,
}

impl SessionReport {
    fn record(&mut self, outcome: &Result<(), RenderError>) {
        match outcome {
            Ok(()) => self.acknowledged += 1,
            Err(RenderError::RemoteFailure { .. }) => self.remote_failures += 1,
            Err(RenderError::Timeout { .. }) => self.timeouts += 1,
            Err(RenderError::SendFailed { .. }) => self.send_failures += 1,
            Err(_) => self.other_failures += 1,
        }
    }

    /// Renders that settled as failed, by any cause
    pub fn failed(&self) -> usize {
        self.remote_failures + self.timeouts + self.send_failures + self.other_failures
    }
}

/// Running renderer plus its loopback surface and listener tasks.
pub struct Session {
    config: RuntimeConfig,
    renderer: Arc<RemoteRenderer>,
    registry: Arc<InMemoryRendererRegistry>,
    teardown: watch::Receiver<Option<RenderError>>,
    tasks: Vec<JoinHandle<()>>,
}

impl Session {
    /// Wire the renderer, surface and listener. Must be called from within
    /// a tokio runtime.
    pub fn start(config: RuntimeConfig) -> Result<Self, RuntimeError> {
        config.validate()?;

        let (transport, frames) = JsonChannelTransport::pair(FRAME_BUFFER);
        let (ack_tx, ack_rx) = mpsc::channel(FRAME_BUFFER);
        let registry = Arc::new(InMemoryRendererRegistry::new());
        let renderer =
            RemoteRenderer::new(config.renderer.clone(), Arc::new(transport), registry.clone())?;

        let (teardown_tx, teardown) = watch::channel(None);
        let teardown_on_failure = config.teardown_on_failure;
        renderer.subscribe_unhandled_failures(move |failure| {
            if !teardown_on_failure {
                debug!(error = %failure, "Continuing after unhandled failure");
                return;
            }
            teardown_tx.send_if_modified(|cause| {
                if cause.is_some() {
                    return false;
                }
                error!(error = %failure, "Tearing down session");
                *cause = Some(failure.clone());
                true
            });
        });

        let surface = LoopbackSurface::new(config.surface.clone());
        let listener = AcknowledgmentListener::new(renderer.clone());
        let tasks = vec![
            tokio::spawn(surface.run(frames, ack_tx)),
            tokio::spawn(listener.run_json(ack_rx)),
        ];

        info!(
            renderer_id = %renderer.renderer_id(),
            demo_batches = config.demo_batches,
            teardown_on_failure,
            "Session started"
        );

        Ok(Self {
            config,
            renderer,
            registry,
            teardown,
            tasks,
        })
    }

    /// Attach the root component, dispatch the demo batches and wait for
    /// all of them to settle.
    pub async fn run_demo(&self) -> Result<SessionReport, RuntimeError> {
        self.renderer
            .attach_root_component(ROOT_COMPONENT_ID, &self.config.root_selector)?;

        let mut tickets = Vec::with_capacity(self.config.demo_batches);
        for frame in 0..self.config.demo_batches {
            let batch = RenderBatch::new(format!("frame-{frame}").into_bytes());
            tickets.push(self.renderer.dispatch(batch)?);
        }

        let settle_all = async {
            let mut report = SessionReport::default();
            for ticket in tickets {
                report.record(&ticket.await);
            }
            report
        };

        let mut teardown = self.teardown.clone();
        tokio::select! {
            biased;
            cause = torn_down(&mut teardown) => Err(RuntimeError::TornDown(cause)),
            report = settle_all => Ok(report),
        }
    }

    /// The renderer driven by this session
    pub fn renderer(&self) -> &Arc<RemoteRenderer> {
        &self.renderer
    }

    /// The failure that triggered teardown, if any.
    pub fn teardown_cause(&self) -> Option<RenderError> {
        self.teardown.borrow().clone()
    }

    /// Dispose the renderer, stop background tasks and return final counters.
    pub fn shutdown(self) -> MetricsSnapshot {
        self.renderer.dispose();
        for task in &self.tasks {
            task.abort();
        }

        let snapshot = self.renderer.metrics().snapshot();
        log_renderer_event!(
            info,
            "Session stopped",
            self.renderer.renderer_id(),
            in_flight = self.renderer.pending_count(),
            registered = self.registry.len()
        );
        snapshot
    }
}

async fn torn_down(teardown: &mut watch::Receiver<Option<RenderError>>) -> RenderError {
    if let Ok(cause) = teardown.wait_for(Option::is_some).await {
        if let Some(failure) = cause.clone() {
            return failure;
        }
    }
    // Sender gone: no teardown can happen any more.
    std::future::pending().await
}
