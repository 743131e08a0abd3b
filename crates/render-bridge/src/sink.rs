//! Exception sink: the single funnel for unhandled render failures.
//!
//! Every render that settles as failed, and every failed fire-and-forget
//! attachment, is reported here. Observers run synchronously on the thread
//! that observed the failure, in registration order. A panicking observer
//! is caught and logged; the sink never unwinds into the settlement path.

use crate::error::RenderError;
use parking_lot::RwLock;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::error;

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Arc<dyn Fn(&RenderError) + Send + Sync>;

/// Per-renderer registry of failure observers.
#[derive(Default)]
pub struct ExceptionSink {
    observers: RwLock<Vec<(SubscriptionId, Observer)>>,
    next_id: AtomicU64,
    notifications: AtomicU64,
}

impl ExceptionSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&RenderError) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.observers.write().push((id, Arc::new(observer)));
        id
    }

    /// Returns `false` if the subscription was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.observers.write();
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }

    /// Deliver a failure to every observer. Returns how many were invoked.
    pub fn notify(&self, failure: &RenderError) -> usize {
        self.notifications.fetch_add(1, Ordering::Relaxed);

        // Snapshot so observers may (un)subscribe without deadlocking.
        let observers: Vec<Observer> = self
            .observers
            .read()
            .iter()
            .map(|(_, observer)| observer.clone())
            .collect();

        for observer in &observers {
            if catch_unwind(AssertUnwindSafe(|| observer(failure))).is_err() {
                error!(error = %failure, "Exception sink observer panicked");
            }
        }
        observers.len()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.read().len()
    }

    /// Total failures delivered, whether or not anyone was subscribed.
    pub fn notifications(&self) -> u64 {
        self.notifications.load(Ordering::Relaxed)
    }
}
