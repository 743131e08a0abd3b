//! Domain layer: identifiers, the completion handle, the pending table and
//! renderer configuration. No I/O lives here.

pub mod completion;
pub mod config;
pub mod ids;
pub mod pending;

pub use completion::{Completion, CompletionHandle, SettlementState};
pub use config::{RendererConfig, DEFAULT_RENDER_TIMEOUT_MS};
pub use ids::{RenderId, RenderIdGenerator, RendererId};
pub use pending::PendingRenderTable;
