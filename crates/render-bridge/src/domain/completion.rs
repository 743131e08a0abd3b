//! Completion handle: a single-assignment result slot with a deadline.
//!
//! Settlement can be attempted from three places at once: the send path
//! (transport failure), the acknowledgment receiver, and the deadline
//! timer. All of them go through `try_succeed` / `try_fail`, which race on
//! one compare-and-set of the state byte. Exactly one attempt wins; the
//! others observe `false` and change nothing.
//!
//! ```text
//!                  try_succeed ──┐
//!   Pending ──CAS──┤              ├──> Succeeded | Failed   (terminal)
//!                  try_fail ─────┘         │
//!                     ▲                    └─ timer aborted, sender fired
//!                     │
//!          timer (Weak ref, sleeps until deadline)
//! ```

use crate::domain::RenderId;
use crate::error::RenderError;
use parking_lot::Mutex;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::trace;

const PENDING: u8 = 0;
const SUCCEEDED: u8 = 1;
const FAILED: u8 = 2;

/// Settlement state of a completion handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementState {
    Pending,
    Succeeded,
    Failed,
}

impl SettlementState {
    fn from_raw(raw: u8) -> Self {
        match raw {
            SUCCEEDED => Self::Succeeded,
            FAILED => Self::Failed,
            _ => Self::Pending,
        }
    }
}

type Outcome<T> = Result<T, RenderError>;

/// Exactly-once result slot for one in-flight render.
///
/// Shared behind an `Arc` between the pending table, the dispatcher and
/// the deadline timer. The timer only holds a weak reference, so a handle
/// that is dropped unsettled does not stay alive until its deadline.
pub struct CompletionHandle<T> {
    render_id: RenderId,
    state: AtomicU8,
    sender: Mutex<Option<oneshot::Sender<Outcome<T>>>>,
    timer: Mutex<Option<JoinHandle<()>>>,
    created_at: Instant,
}

impl<T: Send + 'static> CompletionHandle<T> {
    /// Create a pending handle and the future that resolves when it settles.
    pub fn new(render_id: RenderId) -> (Arc<Self>, Completion<T>) {
        let (tx, rx) = oneshot::channel();
        let handle = Arc::new(Self {
            render_id,
            state: AtomicU8::new(PENDING),
            sender: Mutex::new(Some(tx)),
            timer: Mutex::new(None),
            created_at: Instant::now(),
        });
        let completion = Completion {
            render_id,
            receiver: rx,
        };
        (handle, completion)
    }

    /// Schedule an automatic `Timeout` failure after `timeout`.
    ///
    /// Must be called from within a tokio runtime. Re-arming replaces the
    /// previous timer. Arming an already settled handle is a no-op.
    pub fn arm_timeout(self: &Arc<Self>, timeout: Duration) {
        let weak = Arc::downgrade(self);
        let render_id = self.render_id;
        let task = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if let Some(handle) = weak.upgrade() {
                if handle.try_fail(RenderError::Timeout {
                    render_id,
                    after: timeout,
                }) {
                    trace!(render_id = %render_id, "Render deadline elapsed");
                }
            }
        });

        // Settlers flip the state before taking the timer lock, so checking
        // the state under the lock cannot miss a settlement.
        let mut timer = self.timer.lock();
        if self.is_pending() {
            if let Some(previous) = timer.replace(task) {
                previous.abort();
            }
        } else {
            task.abort();
        }
    }

    /// Settle as succeeded. Returns `false` if the handle already settled.
    pub fn try_succeed(&self, value: T) -> bool {
        self.settle(SUCCEEDED, Ok(value))
    }

    /// Settle as failed. Returns `false` if the handle already settled.
    pub fn try_fail(&self, error: RenderError) -> bool {
        self.settle(FAILED, Err(error))
    }

    fn settle(&self, target: u8, outcome: Outcome<T>) -> bool {
        if self
            .state
            .compare_exchange(PENDING, target, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            trace!(render_id = %self.render_id, "Settlement attempt lost the race");
            return false;
        }

        self.cancel_timer();

        if let Some(sender) = self.sender.lock().take() {
            // Nobody awaiting is fine: the settlement itself already happened.
            let _ = sender.send(outcome);
        }
        true
    }

    fn cancel_timer(&self) {
        if let Some(timer) = self.timer.lock().take() {
            timer.abort();
        }
    }
}

impl<T> CompletionHandle<T> {
    pub fn render_id(&self) -> RenderId {
        self.render_id
    }

    pub fn state(&self) -> SettlementState {
        SettlementState::from_raw(self.state.load(Ordering::Acquire))
    }

    pub fn is_pending(&self) -> bool {
        self.state.load(Ordering::Acquire) == PENDING
    }

    /// Time since the handle was created.
    pub fn elapsed(&self) -> Duration {
        self.created_at.elapsed()
    }
}

impl<T> Drop for CompletionHandle<T> {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.get_mut().take() {
            timer.abort();
        }
    }
}

/// Future resolving to the outcome of a `CompletionHandle`.
///
/// Resolves to `RenderError::Abandoned` if the handle is dropped while
/// still pending.
#[must_use = "a completion does nothing unless awaited"]
pub struct Completion<T> {
    render_id: RenderId,
    receiver: oneshot::Receiver<Outcome<T>>,
}

impl<T> Completion<T> {
    pub fn render_id(&self) -> RenderId {
        self.render_id
    }

    /// Non-blocking check for an outcome. `None` while still pending.
    pub fn try_outcome(&mut self) -> Option<Outcome<T>> {
        match self.receiver.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(RenderError::Abandoned {
                render_id: self.render_id,
            })),
        }
    }
}

impl<T> Future for Completion<T> {
    type Output = Outcome<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let render_id = self.render_id;
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(_)) => Poll::Ready(Err(RenderError::Abandoned { render_id })),
            Poll::Pending => Poll::Pending,
        }
    }
}
