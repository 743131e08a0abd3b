//! # Render Bridge Runtime
//!
//! Runs a demo session against the loopback surface and reports the
//! settlement counters. See `bridge_runtime::config` for the environment
//! variables.

use anyhow::{Context, Result};
use bridge_runtime::{load_config, Session};
use bridge_telemetry::init_logging;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config();
    init_logging(&config.telemetry).context("Failed to initialize logging")?;

    info!(version = render_bridge::VERSION, "Starting render bridge runtime");

    let session = Session::start(config).context("Failed to start session")?;

    let outcome = tokio::select! {
        report = session.run_demo() => Some(report),
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl+C")?;
            info!("Interrupted, shutting down");
            None
        }
    };

    let metrics = session.shutdown();
    info!(
        dispatched = metrics.dispatched,
        succeeded = metrics.succeeded,
        remote_failures = metrics.remote_failures,
        send_failures = metrics.send_failures,
        timeouts = metrics.timeouts,
        stale_acks = metrics.stale_acks,
        attach_failures = metrics.attach_failures,
        "Final render metrics"
    );

    if let Some(outcome) = outcome {
        let report = outcome.context("Demo session failed")?;
        info!(
            acknowledged = report.acknowledged,
            failed = report.failed(),
            "Demo session complete"
        );
    }

    Ok(())
}
