//! Remote renderer: the render dispatcher and acknowledgment receiver.
//!
//! ```text
//! dispatch(batch)
//!   ├─ next render id, CompletionHandle + deadline timer
//!   ├─ insert into PendingRenderTable
//!   └─ spawn settlement task ──> transport.send(RenderBatch)
//!                                   │ Err ──> try_fail(SendFailed)
//!                                   ▼
//!        on_render_completed ──> try_succeed / try_fail(RemoteFailure)
//!        deadline timer ───────> try_fail(Timeout)
//!                                   │ first one wins
//!                                   ▼
//!                     remove from table, count, notify sink on failure,
//!                     resolve the caller's RenderTicket
//! ```
//!
//! Cleanup runs in the spawned settlement task, so a render is removed
//! from the table even if the caller drops its ticket.

use crate::domain::{
    Completion, CompletionHandle, PendingRenderTable, RenderId, RenderIdGenerator,
    RendererConfig, RendererId,
};
use crate::error::{ConfigError, RenderError};
use crate::messages::{OutboundMessage, RenderBatch};
use crate::metrics::RenderMetrics;
use crate::ports::{RenderAcknowledger, RenderTransport, RendererRegistry};
use crate::sink::{ExceptionSink, SubscriptionId};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tracing::{debug, info, trace, warn};

/// Server-side proxy for one remote display surface.
pub struct RemoteRenderer {
    renderer_id: RendererId,
    config: RendererConfig,
    transport: Arc<dyn RenderTransport>,
    registry: Arc<dyn RendererRegistry>,
    pending: Arc<PendingRenderTable>,
    ids: RenderIdGenerator,
    sink: Arc<ExceptionSink>,
    metrics: Arc<RenderMetrics>,
    /// Renders dispatched and not yet cleaned up; bounds `max_in_flight`.
    in_flight: Arc<AtomicUsize>,
    disposed: AtomicBool,
}

impl RemoteRenderer {
    /// Validate `config`, create the renderer and register it.
    pub fn new(
        config: RendererConfig,
        transport: Arc<dyn RenderTransport>,
        registry: Arc<dyn RendererRegistry>,
    ) -> Result<Arc<Self>, ConfigError> {
        config.validate()?;

        Ok(Arc::new_cyclic(|weak: &Weak<Self>| {
            let acknowledger: Weak<dyn RenderAcknowledger> = weak.clone();
            let renderer_id = registry.add(acknowledger);
            info!(
                renderer_id = %renderer_id,
                render_timeout_ms = config.render_timeout_ms,
                "Remote renderer registered"
            );

            Self {
                renderer_id,
                config,
                transport,
                registry,
                pending: Arc::new(PendingRenderTable::new()),
                ids: RenderIdGenerator::new(),
                sink: Arc::new(ExceptionSink::new()),
                metrics: Arc::new(RenderMetrics::new()),
                in_flight: Arc::new(AtomicUsize::new(0)),
                disposed: AtomicBool::new(false),
            }
        }))
    }

    /// Send a render batch and track it until it settles.
    ///
    /// Only precondition violations are returned synchronously. Transport,
    /// remote and timeout failures resolve the returned ticket and are
    /// forwarded to the exception sink. Must be called from within a tokio
    /// runtime.
    pub fn dispatch(&self, batch: RenderBatch) -> Result<RenderTicket, RenderError> {
        self.ensure_active()?;

        if batch.is_empty() {
            return Err(RenderError::InvalidBatch("render batch is empty".into()));
        }

        self.reserve_slot()?;

        let render_id = self.ids.next_id();
        let (handle, completion) = CompletionHandle::new(render_id);
        self.pending.insert(handle.clone());
        handle.arm_timeout(self.config.render_timeout());
        self.metrics.record_dispatch();

        debug!(
            renderer_id = %self.renderer_id,
            render_id = %render_id,
            batch_len = batch.len(),
            "Dispatching render batch"
        );

        let (reply, receiver) = oneshot::channel();
        let task = SettlementTask {
            renderer_id: self.renderer_id,
            render_id,
            handle,
            transport: self.transport.clone(),
            pending: self.pending.clone(),
            sink: self.sink.clone(),
            metrics: self.metrics.clone(),
            in_flight: self.in_flight.clone(),
        };
        let message = OutboundMessage::render_batch(self.renderer_id, render_id, batch);
        tokio::spawn(task.run(message, completion, reply));

        Ok(RenderTicket {
            render_id,
            receiver,
        })
    }

    /// Fire-and-forget attachment of a root component to a remote element.
    ///
    /// Success is not tracked. A send failure is reported to the exception
    /// sink as `AttachFailed`. Must be called from within a tokio runtime.
    pub fn attach_root_component(
        &self,
        component_id: u32,
        selector: &str,
    ) -> Result<(), RenderError> {
        self.ensure_active()?;

        if selector.trim().is_empty() {
            return Err(RenderError::InvalidSelector("selector is empty".into()));
        }

        let message = OutboundMessage::attach_component(self.renderer_id, selector, component_id);
        let selector = selector.to_string();
        let renderer_id = self.renderer_id;
        let transport = self.transport.clone();
        let sink = self.sink.clone();
        let metrics = self.metrics.clone();

        tokio::spawn(async move {
            match transport.send(message).await {
                Ok(()) => debug!(
                    renderer_id = %renderer_id,
                    component_id,
                    selector = %selector,
                    "Root component attach sent"
                ),
                Err(source) => {
                    let failure = RenderError::AttachFailed {
                        component_id,
                        selector,
                        source,
                    };
                    metrics.record_failure(&failure);
                    warn!(renderer_id = %renderer_id, error = %failure, "Unhandled renderer failure");
                    sink.notify(&failure);
                }
            }
        });

        Ok(())
    }

    /// Register an observer for unhandled failures of this renderer.
    pub fn subscribe_unhandled_failures<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&RenderError) + Send + Sync + 'static,
    {
        self.sink.subscribe(observer)
    }

    pub fn exception_sink(&self) -> &Arc<ExceptionSink> {
        &self.sink
    }

    /// Stop accepting new work and release the registry id.
    ///
    /// Renders already in flight are left to settle or time out on their
    /// own. Idempotent.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.registry.remove(self.renderer_id);
        info!(
            renderer_id = %self.renderer_id,
            in_flight = self.pending.len(),
            "Remote renderer disposed"
        );
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    pub fn renderer_id(&self) -> RendererId {
        self.renderer_id
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, render_id: RenderId) -> bool {
        self.pending.contains(render_id)
    }

    pub fn metrics(&self) -> &RenderMetrics {
        &self.metrics
    }

    /// Count one more render in flight, refusing past the configured cap.
    fn reserve_slot(&self) -> Result<(), RenderError> {
        let Some(limit) = self.config.max_in_flight else {
            self.in_flight.fetch_add(1, Ordering::AcqRel);
            return Ok(());
        };
        self.in_flight
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (current < limit).then_some(current + 1)
            })
            .map(|_| ())
            .map_err(|_| RenderError::TooManyInFlight { limit })
    }

    fn ensure_active(&self) -> Result<(), RenderError> {
        if self.is_disposed() {
            return Err(RenderError::Disposed {
                renderer_id: self.renderer_id,
            });
        }
        Ok(())
    }
}

impl RenderAcknowledger for RemoteRenderer {
    fn on_render_completed(&self, render_id: RenderId, error_message: Option<String>) {
        let Some(handle) = self.pending.get(render_id) else {
            self.metrics.record_stale_ack();
            trace!(renderer_id = %self.renderer_id, render_id = %render_id, "Acknowledgment for unknown render");
            return;
        };

        let settled = match error_message.filter(|message| !message.is_empty()) {
            None => handle.try_succeed(()),
            Some(message) => handle.try_fail(RenderError::RemoteFailure { render_id, message }),
        };

        if !settled {
            self.metrics.record_stale_ack();
            trace!(renderer_id = %self.renderer_id, render_id = %render_id, "Acknowledgment for settled render");
        }
    }
}

impl Drop for RemoteRenderer {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// State moved into the per-render settlement task.
struct SettlementTask {
    renderer_id: RendererId,
    render_id: RenderId,
    handle: Arc<CompletionHandle<()>>,
    transport: Arc<dyn RenderTransport>,
    pending: Arc<PendingRenderTable>,
    sink: Arc<ExceptionSink>,
    metrics: Arc<RenderMetrics>,
    in_flight: Arc<AtomicUsize>,
}

impl SettlementTask {
    async fn run(
        self,
        message: OutboundMessage,
        mut completion: Completion<()>,
        reply: oneshot::Sender<Result<(), RenderError>>,
    ) {
        let render_id = self.render_id;

        // A send that hangs must not hold the render past its deadline.
        let outcome = tokio::select! {
            biased;
            sent = self.transport.send(message) => {
                if let Err(source) = sent {
                    self.handle.try_fail(RenderError::SendFailed { render_id, source });
                }
                completion.await
            }
            outcome = &mut completion => outcome,
        };

        self.pending.remove(render_id);
        self.in_flight.fetch_sub(1, Ordering::AcqRel);

        match &outcome {
            Ok(()) => {
                self.metrics.record_success();
                debug!(
                    renderer_id = %self.renderer_id,
                    render_id = %render_id,
                    elapsed_ms = self.handle.elapsed().as_millis() as u64,
                    "Render acknowledged"
                );
            }
            Err(failure) => {
                self.metrics.record_failure(failure);
                warn!(
                    renderer_id = %self.renderer_id,
                    render_id = %render_id,
                    error = %failure,
                    "Unhandled renderer failure"
                );
                self.sink.notify(failure);
            }
        }

        // The caller may have dropped its ticket.
        let _ = reply.send(outcome);
    }
}

/// Awaitable outcome of one dispatched render.
#[must_use = "dropping a ticket does not cancel the render"]
#[derive(Debug)]
pub struct RenderTicket {
    render_id: RenderId,
    receiver: oneshot::Receiver<Result<(), RenderError>>,
}

impl RenderTicket {
    pub fn render_id(&self) -> RenderId {
        self.render_id
    }
}

impl Future for RenderTicket {
    type Output = Result<(), RenderError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let render_id = self.render_id;
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(_)) => Poll::Ready(Err(RenderError::Abandoned { render_id })),
            Poll::Pending => Poll::Pending,
        }
    }
}
