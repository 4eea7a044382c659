// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::record::fields;
use crate::WatchOutcome;
use mb_core::BackoffPolicy;
use tokio_util::sync::CancellationToken;

fn record(pairs: &[(&str, &str)]) -> Record {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn steady_backoff(interval_ms: u64, max_elapsed_ms: u64) -> BackoffPolicy {
    BackoffPolicy {
        initial_interval: Duration::from_millis(interval_ms),
        max_interval: Duration::from_millis(interval_ms),
        multiplier: 1.0,
        randomization_factor: 0.0,
        max_elapsed: Duration::from_millis(max_elapsed_ms),
    }
}

#[tokio::test]
async fn write_read_delete() {
    let store = MemoryStore::new();
    store
        .write("k", record(&[("id", "1v1")]), Duration::ZERO)
        .await
        .unwrap();

    assert_eq!(store.read("k").await.unwrap(), Some(record(&[("id", "1v1")])));
    assert_eq!(store.read_field("k", "id").await.unwrap(), "1v1");
    assert_eq!(store.read_field("k", "missing").await.unwrap(), "");

    store.delete("k").await.unwrap();
    assert_eq!(store.read("k").await.unwrap(), None);
    // deleting again is fine
    store.delete("k").await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn records_expire_after_ttl() {
    let store = MemoryStore::new();
    store
        .write("k", record(&[("id", "1v1")]), Duration::from_secs(10))
        .await
        .unwrap();

    tokio::time::advance(Duration::from_secs(9)).await;
    assert!(store.read("k").await.unwrap().is_some());

    tokio::time::advance(Duration::from_secs(2)).await;
    assert!(store.read("k").await.unwrap().is_none());
    assert_eq!(store.purge_expired(), 1);
}

#[tokio::test]
async fn queue_is_fifo() {
    let store = MemoryStore::new();
    store.enqueue("profileq", "a.1v1").await.unwrap();
    store.enqueue("profileq", "b.1v1").await.unwrap();
    assert_eq!(store.queue_len("profileq"), 2);

    assert_eq!(store.dequeue("profileq").await.unwrap().as_deref(), Some("a.1v1"));
    assert_eq!(store.dequeue("profileq").await.unwrap().as_deref(), Some("b.1v1"));
    assert_eq!(store.dequeue("profileq").await.unwrap(), None);
    assert_eq!(store.dequeue("other").await.unwrap(), None);
}

#[tokio::test]
async fn update_and_delete_fields_across_records() {
    let store = MemoryStore::new();
    store
        .write("p1", record(&[("properties", "{}")]), Duration::ZERO)
        .await
        .unwrap();

    let values: HashMap<String, String> = [
        ("p1".to_string(), "srvA".to_string()),
        ("p2".to_string(), "srvB".to_string()),
    ]
    .into_iter()
    .collect();
    store.update_fields(&values, fields::ASSIGNMENT).await.unwrap();

    assert_eq!(store.read_field("p1", fields::ASSIGNMENT).await.unwrap(), "srvA");
    assert_eq!(store.read_field("p1", "properties").await.unwrap(), "{}");
    assert_eq!(store.read_field("p2", fields::ASSIGNMENT).await.unwrap(), "srvB");

    store
        .delete_fields(&["p1".to_string(), "p2".to_string()], fields::ASSIGNMENT)
        .await
        .unwrap();
    assert_eq!(store.read_field("p1", fields::ASSIGNMENT).await.unwrap(), "");
    assert_eq!(store.read_field("p2", fields::ASSIGNMENT).await.unwrap(), "");
    assert_eq!(store.read_field("p1", "properties").await.unwrap(), "{}");
}

#[tokio::test]
async fn move_membership_between_lists() {
    let store = MemoryStore::new();
    store.add_members("proposed", &["p1", "p2", "p3"]);

    store
        .move_membership(&["p1".to_string(), "p2".to_string()], "proposed", "deindexed")
        .await
        .unwrap();

    assert_eq!(store.members("proposed").await.unwrap(), vec!["p3"]);
    assert_eq!(store.members("deindexed").await.unwrap(), vec!["p1", "p2"]);
}

#[tokio::test]
async fn move_membership_adds_ids_missing_from_source() {
    let store = MemoryStore::new();
    store
        .move_membership(&["p9".to_string()], "proposed", "deindexed")
        .await
        .unwrap();
    assert_eq!(store.members("deindexed").await.unwrap(), vec!["p9"]);
    assert!(store.members("proposed").await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn watch_resolves_once_field_is_written() {
    let store = MemoryStore::new();
    store
        .write("mo-1.1v1", record(&[("id", "1v1")]), Duration::ZERO)
        .await
        .unwrap();

    let worker = store.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(350)).await;
        worker
            .write(
                "mo-1.1v1",
                record(&[("id", "1v1"), (fields::STATUS, "done")]),
                Duration::ZERO,
            )
            .await
            .unwrap();
    });

    let cancel = CancellationToken::new();
    let outcome = store
        .watch("mo-1.1v1", fields::STATUS, &cancel, &steady_backoff(100, 5_000))
        .await;
    assert_eq!(
        outcome,
        WatchOutcome::Resolved(record(&[("id", "1v1"), (fields::STATUS, "done")]))
    );
}

#[tokio::test(start_paused = true)]
async fn watch_times_out_when_nothing_arrives() {
    let store = MemoryStore::new();
    let cancel = CancellationToken::new();
    let started = tokio::time::Instant::now();

    let outcome = store
        .watch("never", fields::STATUS, &cancel, &steady_backoff(100, 1_000))
        .await;

    assert_eq!(outcome, WatchOutcome::TimedOut);
    assert!(started.elapsed() <= Duration::from_millis(1_000));
}

#[tokio::test(start_paused = true)]
async fn watch_stops_promptly_when_cancelled() {
    let store = MemoryStore::new();
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(250)).await;
        trigger.cancel();
    });

    let started = tokio::time::Instant::now();
    let outcome = store
        .watch("never", fields::STATUS, &cancel, &steady_backoff(10_000, 0))
        .await;

    assert_eq!(outcome, WatchOutcome::Cancelled);
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn watch_with_cancelled_token_never_reads() {
    let store = MemoryStore::new();
    store
        .write("k", record(&[(fields::STATUS, "done")]), Duration::ZERO)
        .await
        .unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = store
        .watch("k", fields::STATUS, &cancel, &steady_backoff(10, 100))
        .await;
    assert_eq!(outcome, WatchOutcome::Cancelled);
}
