//! In-memory renderer registry.

use crate::domain::RendererId;
use crate::ports::{RenderAcknowledger, RendererRegistry};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Weak};
use tracing::debug;

/// Hands out renderer ids starting at 1 and resolves them back to live
/// renderers. Entries are weak, so the registry never keeps a renderer
/// alive.
#[derive(Default)]
pub struct InMemoryRendererRegistry {
    renderers: DashMap<RendererId, Weak<dyn RenderAcknowledger>>,
    last_id: AtomicU32,
}

impl InMemoryRendererRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }
}

impl RendererRegistry for InMemoryRendererRegistry {
    fn add(&self, renderer: Weak<dyn RenderAcknowledger>) -> RendererId {
        let id = RendererId::new(self.last_id.fetch_add(1, Ordering::Relaxed) + 1);
        self.renderers.insert(id, renderer);
        debug!(renderer_id = %id, "Renderer added to registry");
        id
    }

    fn remove(&self, id: RendererId) {
        if self.renderers.remove(&id).is_some() {
            debug!(renderer_id = %id, "Renderer removed from registry");
        }
    }

    fn lookup(&self, id: RendererId) -> Option<Arc<dyn RenderAcknowledger>> {
        self.renderers.get(&id).and_then(|entry| entry.value().upgrade())
    }
}
