//! Pending render table.
//!
//! Maps render ids to the completion handle of each in-flight render. The
//! dispatcher inserts, the acknowledgment receiver looks up and settles,
//! and the dispatcher's continuation removes once settlement is observed.
//! The table owns its synchronisation; callers never lock around it.

use crate::domain::completion::CompletionHandle;
use crate::domain::RenderId;
use dashmap::DashMap;
use std::sync::Arc;

/// Concurrent map of in-flight renders.
pub struct PendingRenderTable<T = ()> {
    entries: DashMap<RenderId, Arc<CompletionHandle<T>>>,
}

impl<T> PendingRenderTable<T> {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Register a handle. Returns `false` if the id was already present,
    /// in which case the existing entry is kept.
    pub fn insert(&self, handle: Arc<CompletionHandle<T>>) -> bool {
        match self.entries.entry(handle.render_id()) {
            dashmap::mapref::entry::Entry::Occupied(_) => false,
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(handle);
                true
            }
        }
    }

    /// Look up a handle. Unknown ids yield `None`, never an error.
    pub fn get(&self, render_id: RenderId) -> Option<Arc<CompletionHandle<T>>> {
        // Clone out of the shard guard so settlement never runs under it.
        self.entries.get(&render_id).map(|entry| entry.value().clone())
    }

    /// Remove a settled render, returning its handle if it was present.
    pub fn remove(&self, render_id: RenderId) -> Option<Arc<CompletionHandle<T>>> {
        self.entries.remove(&render_id).map(|(_, handle)| handle)
    }

    /// Check whether a render is still in flight
    pub fn contains(&self, render_id: RenderId) -> bool {
        self.entries.contains_key(&render_id)
    }

    /// Number of renders in flight
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether no render is in flight
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of the ids currently in flight, sorted (for diagnostics).
    pub fn render_ids(&self) -> Vec<RenderId> {
        let mut ids: Vec<RenderId> = self.entries.iter().map(|entry| *entry.key()).collect();
        ids.sort_unstable();
        ids
    }
}

impl<T> Default for PendingRenderTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SettlementState;

    #[test]
    fn test_insert_get_remove() {
        let table = PendingRenderTable::<()>::new();
        let (handle, _completion) = CompletionHandle::new(RenderId::new(1));

        assert!(table.insert(handle.clone()));
        assert!(table.contains(RenderId::new(1)));
        assert_eq!(table.len(), 1);

        let found = table.get(RenderId::new(1)).unwrap();
        assert!(Arc::ptr_eq(&found, &handle));

        assert!(table.remove(RenderId::new(1)).is_some());
        assert!(table.is_empty());
        assert!(table.remove(RenderId::new(1)).is_none());
        assert!(table.get(RenderId::new(1)).is_none());
    }

    #[test]
    fn test_duplicate_insert_keeps_original() {
        let table = PendingRenderTable::<()>::new();
        let (first, _c1) = CompletionHandle::new(RenderId::new(5));
        let (second, _c2) = CompletionHandle::new(RenderId::new(5));

        assert!(table.insert(first.clone()));
        assert!(!table.insert(second));

        let found = table.get(RenderId::new(5)).unwrap();
        assert!(Arc::ptr_eq(&found, &first));
    }

    #[test]
    fn test_settling_one_leaves_others_pending() {
        let table = PendingRenderTable::<()>::new();
        let handles: Vec<_> = (1..=3)
            .map(|i| {
                let (handle, completion) = CompletionHandle::new(RenderId::new(i));
                table.insert(handle.clone());
                (handle, completion)
            })
            .collect();

        assert!(table.get(RenderId::new(2)).unwrap().try_succeed(()));

        assert_eq!(handles[0].0.state(), SettlementState::Pending);
        assert_eq!(handles[1].0.state(), SettlementState::Succeeded);
        assert_eq!(handles[2].0.state(), SettlementState::Pending);
        assert_eq!(
            table.render_ids(),
            vec![RenderId::new(1), RenderId::new(2), RenderId::new(3)]
        );
    }

    #[test]
    fn test_concurrent_insert_and_remove() {
        let table = Arc::new(PendingRenderTable::<()>::new());
        let workers: Vec<_> = (0..4u64)
            .map(|w| {
                let table = table.clone();
                std::thread::spawn(move || {
                    for i in 0..250u64 {
                        let id = RenderId::new(w * 1000 + i);
                        let (handle, _completion) = CompletionHandle::new(id);
                        assert!(table.insert(handle));
                        if i % 2 == 0 {
                            assert!(table.remove(id).is_some());
                        }
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(table.len(), 500);
    }
}
