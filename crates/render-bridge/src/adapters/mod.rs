//! Adapters layer (driven and driving adapters).
//!
//! - `ChannelTransport` / `JsonChannelTransport` - `RenderTransport` over a
//!   tokio mpsc channel, as typed frames or JSON text
//! - `InMemoryRendererRegistry` - `RendererRegistry` backed by a concurrent map
//! - `AcknowledgmentListener` - drains inbound calls into a `RenderAcknowledger`

pub mod channel;
pub mod listener;
pub mod registry;

pub use channel::{ChannelTransport, JsonChannelTransport};
pub use listener::AcknowledgmentListener;
pub use registry::InMemoryRendererRegistry;
