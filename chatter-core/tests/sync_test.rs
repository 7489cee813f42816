//! Synchronizer behavior against the in-process backend.

use std::sync::Arc;
use std::time::Duration;

use chatter_core::{
    ChatterError, MemoryBackend, MessageSynchronizer, RealtimeBackend, SyncNotice, WriteKind,
};
use serde_json::json;

const PATH: &str = "messages";

async fn next(sync: &mut MessageSynchronizer) -> SyncNotice {
    tokio::time::timeout(Duration::from_secs(2), sync.next_notice())
        .await
        .expect("timed out waiting for a notice")
        .expect("synchronizer stopped")
}

async fn next_update(sync: &mut MessageSynchronizer) -> usize {
    loop {
        if let SyncNotice::MessagesUpdated(len) = next(sync).await {
            return len;
        }
    }
}

async fn started(backend: &MemoryBackend) -> MessageSynchronizer {
    let shared: Arc<dyn RealtimeBackend> = Arc::new(backend.clone());
    let mut sync = MessageSynchronizer::new(shared, PATH);
    sync.activate();
    assert_eq!(next_update(&mut sync).await, 0);
    sync
}

#[tokio::test]
async fn test_activate_delivers_initial_snapshot() {
    let backend = MemoryBackend::new();
    let sync = started(&backend).await;

    assert!(sync.is_active());
    assert!(sync.is_connected());
    assert!(sync.messages().is_empty());
    assert_eq!(sync.backend_name(), "memory");
}

#[tokio::test]
async fn test_send_round_trips_through_backend() {
    let backend = MemoryBackend::new();
    let mut sync = started(&backend).await;

    sync.send("  hello ", "ann").unwrap();
    assert_eq!(next_update(&mut sync).await, 1);

    let message = &sync.messages()[0];
    assert_eq!(message.user, "ann");
    assert_eq!(message.text, "hello");
    assert!(message.parsed_timestamp().is_some());
    assert!(!message.id.is_empty());
}

#[tokio::test]
async fn test_blank_send_never_writes() {
    let backend = MemoryBackend::new();
    let sync = started(&backend).await;

    assert!(matches!(sync.send("   ", "ann"), Err(ChatterError::EmptyMessage)));
    assert!(matches!(sync.send("\n\t", "ann"), Err(ChatterError::EmptyMessage)));

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(backend.snapshot(PATH).unwrap(), None);
}

#[tokio::test]
async fn test_snapshot_order_and_ids() {
    let backend = MemoryBackend::new();
    let mut sync = started(&backend).await;

    backend
        .insert_raw(
            PATH,
            "a",
            json!({"user": "bob", "text": "hi", "timestamp": "2024-01-01T00:00:02Z"}),
        )
        .unwrap();
    backend
        .insert_raw(
            PATH,
            "b",
            json!({"user": "ann", "text": "yo", "timestamp": "2024-01-01T00:00:01Z"}),
        )
        .unwrap();

    while next_update(&mut sync).await < 2 {}

    let rendered: Vec<_> = sync
        .messages()
        .iter()
        .map(|m| (m.user.as_str(), m.text.as_str()))
        .collect();
    assert_eq!(rendered, vec![("ann", "yo"), ("bob", "hi")]);
}

#[tokio::test]
async fn test_error_keeps_list_and_blocks_sends() {
    let backend = MemoryBackend::new();
    let mut sync = started(&backend).await;

    sync.send("first", "ann").unwrap();
    assert_eq!(next_update(&mut sync).await, 1);

    backend.emit_error("network unreachable");
    match next(&mut sync).await {
        SyncNotice::ConnectivityChanged(false) => {}
        other => panic!("unexpected {other:?}"),
    }
    assert!(!sync.is_connected());
    assert_eq!(sync.messages().len(), 1);

    assert!(matches!(sync.send("second", "ann"), Err(ChatterError::Offline)));
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(backend.snapshot(PATH).unwrap().unwrap().len(), 1);
    assert_eq!(sync.messages().len(), 1);

    backend.reconnect();
    match next(&mut sync).await {
        SyncNotice::ConnectivityChanged(true) => {}
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(next_update(&mut sync).await, 1);
    assert!(sync.is_connected());
}

#[tokio::test]
async fn test_repeated_errors_notify_once() {
    let backend = MemoryBackend::new();
    let mut sync = started(&backend).await;

    backend.emit_error("one");
    backend.emit_error("two");
    tokio::time::sleep(Duration::from_millis(50)).await;

    let notices = sync.poll();
    let offline = notices
        .iter()
        .filter(|n| matches!(n, SyncNotice::ConnectivityChanged(false)))
        .count();
    assert_eq!(offline, 1);
}

#[tokio::test]
async fn test_failed_send_reports_and_leaves_list() {
    let backend = MemoryBackend::new();
    let mut sync = started(&backend).await;

    backend.fail_writes(true);
    sync.send("hello", "ann").unwrap();

    match next(&mut sync).await {
        SyncNotice::WriteFailed { kind, error } => {
            assert_eq!(kind, WriteKind::Send);
            assert!(matches!(error, ChatterError::RequestFailed(_)));
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(sync.messages().is_empty());
    assert!(sync.is_connected());
}

#[tokio::test]
async fn test_clear_empties_every_client() {
    let backend = MemoryBackend::new();
    let mut ann = started(&backend).await;
    let mut bob = started(&backend).await;

    ann.send("hi bob", "ann").unwrap();
    assert_eq!(next_update(&mut ann).await, 1);
    assert_eq!(next_update(&mut bob).await, 1);
    assert_eq!(bob.messages()[0].user, "ann");

    bob.clear();
    assert_eq!(next_update(&mut ann).await, 0);
    assert_eq!(next_update(&mut bob).await, 0);
    assert!(ann.messages().is_empty());
}

#[tokio::test]
async fn test_failed_clear_reports() {
    let backend = MemoryBackend::new();
    let mut sync = started(&backend).await;

    backend.fail_writes(true);
    sync.clear();

    match next(&mut sync).await {
        SyncNotice::WriteFailed { kind, .. } => assert_eq!(kind, WriteKind::Clear),
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn test_no_notices_after_deactivate() {
    let backend = MemoryBackend::new();
    let mut sync = started(&backend).await;

    sync.deactivate();
    assert!(!sync.is_active());

    backend
        .insert_raw(
            PATH,
            "x",
            json!({"user": "bob", "text": "late", "timestamp": "2024-01-01T00:00:00Z"}),
        )
        .unwrap();
    backend.emit_error("late error");
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(sync.poll().is_empty());
    assert!(sync.next_notice().await.is_none());
    assert!(sync.messages().is_empty());
    assert!(sync.is_connected());
}

#[tokio::test]
async fn test_poll_drains_without_blocking() {
    let backend = MemoryBackend::new();
    let shared: Arc<dyn RealtimeBackend> = Arc::new(backend.clone());
    let mut sync = MessageSynchronizer::new(shared, PATH);

    assert!(sync.poll().is_empty());

    sync.activate();
    sync.activate();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let notices = sync.poll();
    assert!(notices
        .iter()
        .any(|n| matches!(n, SyncNotice::MessagesUpdated(0))));
    assert!(sync.poll().is_empty());
}

#[tokio::test]
async fn test_failure_before_deactivate_still_reported() {
    let backend = MemoryBackend::new();
    let mut sync = started(&backend).await;

    backend.fail_writes(true);
    sync.send("hello", "ann").unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    sync.deactivate();

    let notices = sync.poll();
    assert_eq!(notices.len(), 1);
    assert!(matches!(
        notices[0],
        SyncNotice::WriteFailed {
            kind: WriteKind::Send,
            ..
        }
    ));
    assert!(sync.poll().is_empty());
}

#[tokio::test]
async fn test_in_flight_failure_reported_once_after_switch() {
    let backend = MemoryBackend::new();
    let mut sync = started(&backend).await;

    backend.delay_writes(Duration::from_millis(100));
    backend.fail_writes(true);
    sync.send("hello", "ann").unwrap();

    sync.deactivate();
    assert!(sync.poll().is_empty());

    sync.activate();
    tokio::time::sleep(Duration::from_millis(300)).await;

    let notices = sync.poll();
    let updates = notices
        .iter()
        .filter(|n| matches!(n, SyncNotice::MessagesUpdated(0)))
        .count();
    let failures = notices
        .iter()
        .filter(|n| {
            matches!(
                n,
                SyncNotice::WriteFailed {
                    kind: WriteKind::Send,
                    error: ChatterError::RequestFailed(_)
                }
            )
        })
        .count();
    assert_eq!(updates, 1);
    assert_eq!(failures, 1);
    assert_eq!(notices.len(), 2);
    assert!(sync.poll().is_empty());
}

#[tokio::test]
async fn test_inactive_next_notice_yields_write_failure() {
    let backend = MemoryBackend::new();
    let mut sync = started(&backend).await;

    backend.fail_writes(true);
    sync.clear();
    tokio::time::sleep(Duration::from_millis(50)).await;
    sync.deactivate();

    match sync.next_notice().await {
        Some(SyncNotice::WriteFailed { kind, .. }) => assert_eq!(kind, WriteKind::Clear),
        other => panic!("unexpected {other:?}"),
    }
    assert!(sync.next_notice().await.is_none());
}
