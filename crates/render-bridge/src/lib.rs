//! # Render Bridge
//!
//! Delivers render batches from a server-resident UI engine to a remote
//! display surface and learns, asynchronously, whether each batch was
//! applied, failed, or never acknowledged.
//!
//! ## Architecture
//!
//! ```text
//!  rendering engine
//!        │ RenderBatch
//!        ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │                    RemoteRenderer                        │
//! │  dispatch ──> RenderIdGenerator ──> CompletionHandle     │
//! │                    │                  (deadline timer)   │
//! │                    ▼                                     │
//! │            PendingRenderTable <── on_render_completed    │
//! │                    │                                     │
//! │     settled ──> cleanup ──> ExceptionSink (failures)     │
//! └───────┬──────────────────────────────────▲───────────────┘
//!         │ RenderTransport::send            │ InboundCall
//!         ▼                                  │
//!     transport ─────> remote surface ───────┘
//! ```
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain** (`domain/`): ids, `CompletionHandle`, `PendingRenderTable`,
//!   `RendererConfig`
//! - **Ports** (`ports/`): `RenderAcknowledger` (inbound),
//!   `RenderTransport` and `RendererRegistry` (outbound)
//! - **Service** (`service`): `RemoteRenderer`, the dispatcher and
//!   acknowledgment receiver
//! - **Adapters** (`adapters/`): channel transports, in-memory registry,
//!   acknowledgment listener
//!
//! ## Settlement guarantees
//!
//! - Every dispatched render settles exactly once: acknowledged, failed
//!   remotely, failed to send, or timed out.
//! - A send failure settles immediately, without waiting for the deadline.
//! - Acknowledgments for unknown or already settled ids are ignored.
//! - Every failure is forwarded to the renderer's `ExceptionSink`.
//!
//! ## Usage
//!
//! ```ignore
//! use render_bridge::{
//!     ChannelTransport, InMemoryRendererRegistry, RemoteRenderer, RenderBatch, RendererConfig,
//! };
//! use std::sync::Arc;
//!
//! let (transport, frames) = ChannelTransport::pair(64);
//! let registry = Arc::new(InMemoryRendererRegistry::new());
//! let renderer = RemoteRenderer::new(RendererConfig::default(), Arc::new(transport), registry)?;
//!
//! renderer.subscribe_unhandled_failures(|err| tracing::warn!(error = %err, "render failed"));
//! let ticket = renderer.dispatch(RenderBatch::new(payload))?;
//! ticket.await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod domain;
pub mod error;
pub mod messages;
pub mod metrics;
pub mod ports;
pub mod service;
pub mod sink;

pub use adapters::{
    AcknowledgmentListener, ChannelTransport, InMemoryRendererRegistry, JsonChannelTransport,
};
pub use domain::{
    Completion, CompletionHandle, PendingRenderTable, RenderId, RenderIdGenerator, RendererConfig,
    RendererId, SettlementState, DEFAULT_RENDER_TIMEOUT_MS,
};
pub use error::{ConfigError, RenderError, TransportError};
pub use messages::{InboundCall, OutboundMessage, RenderBatch};
pub use metrics::{MetricsSnapshot, RenderMetrics};
pub use ports::{RenderAcknowledger, RenderTransport, RendererRegistry};
pub use service::{RemoteRenderer, RenderTicket};
pub use sink::{ExceptionSink, SubscriptionId};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
