//! Settlement protocol properties, driven through `RemoteRenderer`.

mod common;

use common::{renderer_with, PendingTransport, ScriptedTransport};
use render_bridge::{RenderAcknowledger, RenderBatch, RenderError, RenderId, RendererConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

fn batch(tag: u8) -> RenderBatch {
    RenderBatch::new(vec![tag, 0x01, 0x02])
}

#[tokio::test(start_paused = true)]
async fn test_ack_timeout_and_send_failure_scenario() {
    let transport = Arc::new(ScriptedTransport::default());
    let (renderer, sink) = renderer_with(RendererConfig::default(), transport.clone());
    let deadline = renderer.config().render_timeout();

    // A: acknowledged 50ms after dispatch.
    let a = renderer.dispatch(batch(0xA)).unwrap();
    assert_eq!(a.render_id(), RenderId::new(1));
    let acker = renderer.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        acker.on_render_completed(RenderId::new(1), None);
    });
    assert_eq!(a.await, Ok(()));
    assert!(sink.lock().is_empty());

    // B: never acknowledged. C: the send itself fails.
    transport.fail_render(3);
    let started = Instant::now();
    let b = renderer.dispatch(batch(0xB)).unwrap();
    let c = renderer.dispatch(batch(0xC)).unwrap();
    assert_eq!(b.render_id(), RenderId::new(2));
    assert_eq!(c.render_id(), RenderId::new(3));

    let c_outcome = c.await;
    assert!(started.elapsed() < deadline);
    assert!(matches!(
        c_outcome,
        Err(RenderError::SendFailed { render_id, .. }) if render_id == RenderId::new(3)
    ));
    assert!(renderer.is_pending(RenderId::new(2)));

    let b_outcome = b.await;
    assert!(started.elapsed() >= deadline);
    assert_eq!(
        b_outcome,
        Err(RenderError::Timeout {
            render_id: RenderId::new(2),
            after: deadline,
        })
    );
    assert!(!renderer.is_pending(RenderId::new(2)));

    {
        let sink = sink.lock();
        assert_eq!(sink.len(), 2);
        assert_eq!(sink[0].render_id(), Some(RenderId::new(3)));
        assert!(sink[1].is_timeout());
    }

    // Late acknowledgment for B is a no-op.
    renderer.on_render_completed(RenderId::new(2), None);
    assert_eq!(sink.lock().len(), 2);
    assert_eq!(renderer.pending_count(), 0);

    let snapshot = renderer.metrics().snapshot();
    assert_eq!(snapshot.dispatched, 3);
    assert_eq!(snapshot.succeeded, 1);
    assert_eq!(snapshot.timeouts, 1);
    assert_eq!(snapshot.send_failures, 1);
    assert_eq!(snapshot.stale_acks, 1);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_within_deadline_and_slack() {
    let config = RendererConfig::default().with_render_timeout(Duration::from_millis(250));
    let (renderer, sink) = renderer_with(config, Arc::new(ScriptedTransport::default()));

    let started = Instant::now();
    let outcome = renderer.dispatch(batch(1)).unwrap().await;
    let elapsed = started.elapsed();

    assert!(outcome.unwrap_err().is_timeout());
    assert!(elapsed >= Duration::from_millis(250));
    assert!(elapsed <= Duration::from_millis(250) + Duration::from_millis(10));
    assert_eq!(sink.lock().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_send_failure_ignores_large_deadline() {
    let transport = Arc::new(ScriptedTransport::default());
    transport.fail_render(1);
    let config = RendererConfig::default().with_render_timeout(Duration::from_secs(3600));
    let (renderer, sink) = renderer_with(config, transport);

    let started = Instant::now();
    let outcome = renderer.dispatch(batch(1)).unwrap().await;

    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(matches!(outcome, Err(RenderError::SendFailed { .. })));
    assert_eq!(sink.lock().len(), 1);
    assert_eq!(renderer.pending_count(), 0);
}

#[tokio::test]
async fn test_duplicate_ack_is_noop() {
    let (renderer, sink) = renderer_with(
        RendererConfig::default(),
        Arc::new(ScriptedTransport::default()),
    );

    let ticket = renderer.dispatch(batch(1)).unwrap();
    let id = ticket.render_id();
    renderer.on_render_completed(id, None);
    renderer.on_render_completed(id, Some("late failure".into()));

    assert_eq!(ticket.await, Ok(()));
    assert!(!renderer.is_pending(id));
    renderer.on_render_completed(id, None);

    assert!(sink.lock().is_empty());
    assert_eq!(renderer.metrics().snapshot().succeeded, 1);
    assert_eq!(renderer.metrics().snapshot().stale_acks, 2);
}

#[tokio::test]
async fn test_unknown_ack_changes_nothing() {
    let (renderer, sink) = renderer_with(
        RendererConfig::default(),
        Arc::new(ScriptedTransport::default()),
    );
    let _ticket = renderer.dispatch(batch(1)).unwrap();

    renderer.on_render_completed(RenderId::new(999), None);
    renderer.on_render_completed(RenderId::new(999), Some("boom".into()));

    assert_eq!(renderer.pending_count(), 1);
    assert!(renderer.is_pending(RenderId::new(1)));
    assert!(sink.lock().is_empty());
}

#[tokio::test]
async fn test_concurrent_renders_settle_independently() {
    let (renderer, sink) = renderer_with(
        RendererConfig::default(),
        Arc::new(ScriptedTransport::default()),
    );

    let tickets: Vec<_> = (0..10u8)
        .map(|i| renderer.dispatch(batch(i)).unwrap())
        .collect();
    assert_eq!(renderer.pending_count(), 10);

    renderer.on_render_completed(RenderId::new(5), Some("only five".into()));
    for id in 1..=10u64 {
        if id != 5 {
            assert!(renderer.is_pending(RenderId::new(id)));
        }
    }

    // Remaining acknowledgments arrive in reverse order.
    for id in (1..=10u64).rev().filter(|id| *id != 5) {
        renderer.on_render_completed(RenderId::new(id), None);
    }

    for ticket in tickets {
        let id = ticket.render_id();
        let outcome = ticket.await;
        if id == RenderId::new(5) {
            assert!(matches!(outcome, Err(RenderError::RemoteFailure { .. })));
        } else {
            assert_eq!(outcome, Ok(()));
        }
    }
    assert_eq!(sink.lock().len(), 1);
    assert_eq!(renderer.pending_count(), 0);
}

#[tokio::test]
async fn test_dropped_ticket_still_cleaned_up() {
    let (renderer, _sink) = renderer_with(
        RendererConfig::default(),
        Arc::new(ScriptedTransport::default()),
    );

    let ticket = renderer.dispatch(batch(1)).unwrap();
    let id = ticket.render_id();
    drop(ticket);
    renderer.on_render_completed(id, None);

    tokio::time::timeout(Duration::from_secs(5), async {
        while renderer.is_pending(id) {
            tokio::task::yield_now().await;
        }
    })
    .await
    .unwrap();
    assert_eq!(renderer.metrics().snapshot().succeeded, 1);
}

#[tokio::test]
async fn test_dispose_leaves_pending_renders_to_settle() {
    let (renderer, _sink) = renderer_with(
        RendererConfig::default(),
        Arc::new(ScriptedTransport::default()),
    );

    let ticket = renderer.dispatch(batch(1)).unwrap();
    renderer.dispose();
    assert!(renderer.is_pending(ticket.render_id()));

    renderer.on_render_completed(ticket.render_id(), None);
    assert_eq!(ticket.await, Ok(()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_acks_and_deadlines_settle_once() {
    let config = RendererConfig::default().with_render_timeout(Duration::from_millis(20));
    let (renderer, sink) = renderer_with(config, Arc::new(ScriptedTransport::default()));

    let tickets: Vec<_> = (0..200u32)
        .map(|i| renderer.dispatch(batch(i as u8)).unwrap())
        .collect();

    // Acknowledge every render, some well after their deadline.
    let acker = renderer.clone();
    let acks = tokio::spawn(async move {
        for id in 1..=200u64 {
            if id % 3 == 0 {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
            let error = (id % 7 == 0).then(|| format!("render {id} rejected"));
            acker.on_render_completed(RenderId::new(id), error);
        }
    });

    let mut failures = 0;
    for ticket in tickets {
        if ticket.await.is_err() {
            failures += 1;
        }
    }
    acks.await.unwrap();

    let snapshot = renderer.metrics().snapshot();
    assert_eq!(snapshot.settled(), 200);
    assert_eq!(snapshot.succeeded + failures, 200);
    assert_eq!(sink.lock().len() as u64, failures);
    assert_eq!(renderer.pending_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_hung_send_still_times_out() {
    let (renderer, sink) = renderer_with(RendererConfig::default(), Arc::new(PendingTransport));
    let deadline = renderer.config().render_timeout();

    let started = Instant::now();
    let outcome = renderer.dispatch(batch(1)).unwrap().await;

    assert_eq!(
        outcome,
        Err(RenderError::Timeout {
            render_id: RenderId::new(1),
            after: deadline,
        })
    );
    assert!(started.elapsed() >= deadline);
    assert_eq!(renderer.pending_count(), 0);
    assert_eq!(sink.lock().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_ack_settles_while_send_hangs() {
    let (renderer, sink) = renderer_with(RendererConfig::default(), Arc::new(PendingTransport));

    let ticket = renderer.dispatch(batch(1)).unwrap();
    let id = ticket.render_id();
    tokio::task::yield_now().await;
    renderer.on_render_completed(id, None);

    assert_eq!(ticket.await, Ok(()));
    assert_eq!(renderer.pending_count(), 0);
    assert!(sink.lock().is_empty());
}
