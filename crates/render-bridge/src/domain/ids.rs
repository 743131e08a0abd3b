//! Identifiers for renderers and render operations.
//!
//! A `RenderId` correlates one dispatched batch with its acknowledgment.
//! Ids are per-renderer and strictly increasing, starting at 1.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifier of a single dispatched render batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenderId(u64);

impl RenderId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RenderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RenderId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Stable identifier handed out by the renderer registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RendererId(u32);

impl RendererId {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for RendererId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic source of render ids for one renderer.
#[derive(Debug, Default)]
pub struct RenderIdGenerator {
    last: AtomicU64,
}

impl RenderIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically take the next id.
    pub fn next_id(&self) -> RenderId {
        RenderId(self.last.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// The most recently issued id, or 0 if none was issued yet.
    pub fn last_issued(&self) -> u64 {
        self.last.load(Ordering::Relaxed)
    }
}
