//! # Bridge Runtime
//!
//! Composition root for the render bridge.
//!
//! ## Modules
//!
//! - `config` - `RuntimeConfig` loaded from `RB_*` environment variables
//! - `error` - `RuntimeError`
//! - `surface` - loopback remote surface that acknowledges render frames
//! - `session` - wires renderer, transport, listener and surface together
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from the environment
//! 2. Initialize logging
//! 3. Start the session (registry, transport, surface, listener)
//! 4. Subscribe to the exception sink with the teardown policy
//! 5. Attach the root component and dispatch the demo batches
//! 6. Dispose the renderer and stop background tasks

pub mod config;
pub mod error;
pub mod session;
pub mod surface;

pub use config::{load_config, RuntimeConfig};
pub use error::RuntimeError;
pub use session::{Session, SessionReport};
pub use surface::{LoopbackSurface, SurfaceBehavior, SurfaceReply};
