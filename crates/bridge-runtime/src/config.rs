//! # Runtime Configuration
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `RB_DEMO_BATCHES` | `8` | Render batches dispatched by the demo session |
//! | `RB_TEARDOWN_ON_FAILURE` | `false` | Tear the session down on the first unhandled failure |
//! | `RB_ROOT_SELECTOR` | `#app` | Element the root component is attached to |
//! | `RB_SURFACE_REJECT_EVERY` | `4` | Loopback surface fails every Nth render (0 = never) |
//! | `RB_SURFACE_DROP_EVERY` | `0` | Loopback surface never acknowledges every Nth render (0 = never) |
//! | `RB_SURFACE_ACK_DELAY_MS` | `5` | Delay before the loopback surface acknowledges |
//!
//! Renderer and logging settings come from `RendererConfig::from_env` and
//! `TelemetryConfig::from_env`.

use crate::error::RuntimeError;
use crate::surface::SurfaceBehavior;
use bridge_telemetry::TelemetryConfig;
use render_bridge::RendererConfig;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Complete runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub renderer: RendererConfig,
    pub telemetry: TelemetryConfig,
    pub surface: SurfaceBehavior,
    pub demo_batches: usize,
    pub teardown_on_failure: bool,
    pub root_selector: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            renderer: RendererConfig::default(),
            telemetry: TelemetryConfig::default(),
            surface: SurfaceBehavior::default(),
            demo_batches: 8,
            teardown_on_failure: false,
            root_selector: "#app".to_string(),
        }
    }
}

impl RuntimeConfig {
    pub fn validate(&self) -> Result<(), RuntimeError> {
        self.renderer.validate()?;
        if self.root_selector.trim().is_empty() {
            return Err(RuntimeError::InvalidConfig(
                "root_selector cannot be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Load configuration from environment variables.
pub fn load_config() -> RuntimeConfig {
    let config = RuntimeConfig {
        renderer: RendererConfig::from_env(),
        telemetry: TelemetryConfig::from_env(),
        ..RuntimeConfig::default()
    };
    apply_overrides(config, |key| env::var(key).ok())
}

/// Overlay the runtime knobs found by `lookup` onto `config`.
fn apply_overrides(
    mut config: RuntimeConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> RuntimeConfig {
    if let Some(batches) = parse_var(&lookup, "RB_DEMO_BATCHES") {
        config.demo_batches = batches;
    }
    if let Some(flag) = lookup("RB_TEARDOWN_ON_FAILURE") {
        config.teardown_on_failure = flag.to_lowercase() == "true" || flag == "1";
    }
    if let Some(selector) = lookup("RB_ROOT_SELECTOR") {
        config.root_selector = selector;
    }
    if let Some(every) = parse_var(&lookup, "RB_SURFACE_REJECT_EVERY") {
        config.surface.reject_every = every;
    }
    if let Some(every) = parse_var(&lookup, "RB_SURFACE_DROP_EVERY") {
        config.surface.drop_every = every;
    }
    if let Some(delay) = parse_var(&lookup, "RB_SURFACE_ACK_DELAY_MS") {
        config.surface.ack_delay = Duration::from_millis(delay);
    }

    config
}

fn parse_var<T: FromStr>(lookup: impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(variable = key, value = %raw, "Ignoring unparseable environment variable");
            None
        }
    }
}
