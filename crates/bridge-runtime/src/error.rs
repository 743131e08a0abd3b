//! Runtime errors.

use render_bridge::{ConfigError, RenderError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("renderer configuration rejected: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid runtime configuration: {0}")]
    InvalidConfig(String),

    #[error("render request rejected: {0}")]
    Render(#[from] RenderError),

    #[error("session torn down after unhandled failure: {0}")]
    TornDown(RenderError),
}
