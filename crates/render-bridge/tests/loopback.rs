//! End-to-end over JSON channels: renderer -> remote surface -> listener.

use render_bridge::{
    AcknowledgmentListener, InMemoryRendererRegistry, InboundCall, JsonChannelTransport,
    OutboundMessage, RemoteRenderer, RenderAcknowledger, RenderBatch, RenderError, RenderId,
    RendererConfig, RendererRegistry,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

const REJECT: u8 = 0xFF;
const IGNORE: u8 = 0xEE;

/// Acks every batch, failing those tagged `REJECT` and ignoring `IGNORE`.
async fn remote_surface(mut frames: mpsc::Receiver<String>, acks: mpsc::Sender<String>) {
    while let Some(frame) = frames.recv().await {
        let Ok(OutboundMessage::RenderBatch(frame)) = OutboundMessage::from_json(&frame) else {
            continue;
        };
        let error = match frame.batch.as_bytes().first() {
            Some(&IGNORE) => continue,
            Some(&REJECT) => Some(format!("cannot apply render {}", frame.render_id)),
            _ => None,
        };
        let reply = InboundCall::render_completed(frame.render_id, error)
            .to_json()
            .unwrap();
        if acks.send(reply).await.is_err() {
            break;
        }
    }
}

struct Harness {
    renderer: Arc<RemoteRenderer>,
    registry: Arc<InMemoryRendererRegistry>,
}

fn harness(config: RendererConfig) -> Harness {
    let (transport, frames) = JsonChannelTransport::pair(64);
    let (ack_tx, ack_rx) = mpsc::channel(64);
    let registry = Arc::new(InMemoryRendererRegistry::new());
    let renderer = RemoteRenderer::new(config, Arc::new(transport), registry.clone()).unwrap();

    tokio::spawn(remote_surface(frames, ack_tx));
    tokio::spawn(AcknowledgmentListener::new(renderer.clone()).run_json(ack_rx));

    Harness { renderer, registry }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_round_trip_outcomes() {
    let config = RendererConfig::default().with_render_timeout(Duration::from_millis(200));
    let Harness { renderer, .. } = harness(config);

    let ok = renderer.dispatch(RenderBatch::new(vec![1, 2, 3])).unwrap();
    let rejected = renderer.dispatch(RenderBatch::new(vec![REJECT])).unwrap();
    let ignored = renderer.dispatch(RenderBatch::new(vec![IGNORE])).unwrap();

    assert_eq!(ok.await, Ok(()));
    assert_eq!(
        rejected.await,
        Err(RenderError::RemoteFailure {
            render_id: RenderId::new(2),
            message: "cannot apply render 2".into(),
        })
    );
    assert!(ignored.await.unwrap_err().is_timeout());

    let snapshot = renderer.metrics().snapshot();
    assert_eq!(snapshot.succeeded, 1);
    assert_eq!(snapshot.remote_failures, 1);
    assert_eq!(snapshot.timeouts, 1);
    assert_eq!(renderer.pending_count(), 0);
    assert_eq!(renderer.exception_sink().notifications(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_concurrent_renders() {
    let Harness { renderer, .. } = harness(RendererConfig::default());

    let tickets: Vec<_> = (1..=100u32)
        .map(|i| {
            let tag = if i % 10 == 0 { REJECT } else { 1 };
            renderer.dispatch(RenderBatch::new(vec![tag])).unwrap()
        })
        .collect();

    let mut failed = 0;
    for ticket in tickets {
        match ticket.await {
            Ok(()) => {}
            Err(RenderError::RemoteFailure { .. }) => failed += 1,
            Err(other) => panic!("unexpected outcome: {other}"),
        }
    }

    assert_eq!(failed, 10);
    assert_eq!(renderer.pending_count(), 0);
}

#[tokio::test]
async fn test_closed_transport_fails_fast() {
    let (transport, frames) = JsonChannelTransport::pair(4);
    drop(frames);
    let registry = Arc::new(InMemoryRendererRegistry::new());
    let renderer =
        RemoteRenderer::new(RendererConfig::default(), Arc::new(transport), registry).unwrap();

    let outcome = tokio::time::timeout(
        Duration::from_secs(5),
        renderer.dispatch(RenderBatch::new(vec![1])).unwrap(),
    )
    .await
    .unwrap();

    assert!(matches!(outcome, Err(RenderError::SendFailed { .. })));
}

#[tokio::test]
async fn test_registry_routes_acks_by_renderer() {
    let Harness { renderer, registry } = harness(RendererConfig::default());
    let acknowledger = registry.lookup(renderer.renderer_id()).unwrap();

    let (transport, _frames) = JsonChannelTransport::pair(4);
    let other = RemoteRenderer::new(RendererConfig::default(), Arc::new(transport), registry.clone())
        .unwrap();
    assert_ne!(other.renderer_id(), renderer.renderer_id());

    let ticket = other.dispatch(RenderBatch::new(vec![IGNORE])).unwrap();
    // Routed to the first renderer, which has no such render.
    acknowledger.on_render_completed(ticket.render_id(), None);
    assert!(other.is_pending(ticket.render_id()));

    registry
        .lookup(other.renderer_id())
        .unwrap()
        .on_render_completed(ticket.render_id(), None);
    assert_eq!(ticket.await, Ok(()));

    drop(other);
    assert_eq!(registry.len(), 1);
}
