//! Ports layer (hexagonal architecture).
//!
//! - **Inbound** (driving): `RenderAcknowledger`, called by the transport
//!   when the remote surface reports a render outcome.
//! - **Outbound** (driven): `RenderTransport` and `RendererRegistry`, the
//!   external collaborators the renderer depends on.

pub mod inbound;
pub mod outbound;

pub use inbound::RenderAcknowledger;
pub use outbound::{RenderTransport, RendererRegistry};
