// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use mb_adapters::{FakeStateStore, JsonPathConverter, StoreCall, StoreOp};
use mb_core::{InMemoryMetrics, JsonKeys, Roster, SequentialIdGen};
use mb_storage::Record;
use tokio::task::JoinHandle;

const QUEUE: &str = "profileq";

type TestCoordinator =
    RequestCoordinator<FakeStateStore, SequentialIdGen, InMemoryMetrics, JsonPathConverter>;

fn steady_backoff(interval_ms: u64, max_elapsed_ms: u64) -> BackoffPolicy {
    BackoffPolicy {
        initial_interval: Duration::from_millis(interval_ms),
        max_interval: Duration::from_millis(interval_ms),
        multiplier: 1.0,
        randomization_factor: 0.0,
        max_elapsed: Duration::from_millis(max_elapsed_ms),
    }
}

fn coordinator_with(
    store: &FakeStateStore,
    metrics: &InMemoryMetrics,
    keys: JsonKeys,
    backoff: BackoffPolicy,
) -> TestCoordinator {
    RequestCoordinator::new(
        store.clone(),
        SequentialIdGen::default(),
        metrics.clone(),
        LegacyShim::new(JsonPathConverter, keys),
        RequestSettings {
            queue: QUEUE.to_string(),
            ttl: Duration::from_secs(1800),
            backoff,
        },
    )
}

fn coordinator(store: &FakeStateStore, metrics: &InMemoryMetrics) -> TestCoordinator {
    coordinator_with(store, metrics, JsonKeys::default(), steady_backoff(100, 5_000))
}

/// Pops one request key and finishes it, playing the part of a worker
fn spawn_worker<F>(store: &FakeStateStore, fill: F) -> JoinHandle<String>
where
    F: FnOnce(&mut Record) + Send + 'static,
{
    let memory = store.memory().clone();
    tokio::spawn(async move {
        let key = loop {
            if let Some(key) = memory.dequeue(QUEUE).await.unwrap() {
                break key;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        };
        let mut record = memory.read(&key).await.unwrap().unwrap_or_default();
        fill(&mut record);
        record.insert(fields::STATUS.to_string(), "done".to_string());
        memory.write(&key, record, Duration::ZERO).await.unwrap();
        key
    })
}

#[tokio::test(start_paused = true)]
async fn resolves_with_the_workers_result() {
    let store = FakeStateStore::new();
    let metrics = InMemoryMetrics::new();
    let worker = spawn_worker(&store, |record| {
        record.insert(
            fields::ROSTERS.to_string(),
            r#"[{"name":"red","players":[{"id":"p1"}]}]"#.to_string(),
        );
    });

    let result = coordinator(&store, &metrics)
        .create_match(MatchProfile::new("1v1", "{}"), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(worker.await.unwrap(), "mo-1.1v1");
    assert_eq!(result.id, "1v1");
    assert_eq!(result.error, "");
    assert_eq!(
        result.rosters,
        Some(vec![Roster::new("red", vec![mb_core::Player::new("p1")])])
    );
    assert_eq!(metrics.get(OperationKind::CreateMatch, Counter::Requests), 1);
    assert_eq!(metrics.get(OperationKind::CreateMatch, Counter::Errors), 0);
}

#[tokio::test(start_paused = true)]
async fn writes_then_enqueues_under_the_request_key() {
    let store = FakeStateStore::new();
    let metrics = InMemoryMetrics::new();
    spawn_worker(&store, |_| {});

    coordinator(&store, &metrics)
        .create_match(MatchProfile::new("1v1", "{}"), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        store.mutations(),
        vec![
            StoreCall::Write {
                key: "mo-1.1v1".to_string(),
                ttl: Duration::from_secs(1800),
            },
            StoreCall::Enqueue {
                queue: QUEUE.to_string(),
                item: "mo-1.1v1".to_string(),
            },
        ]
    );
}

#[tokio::test]
async fn write_failure_returns_an_empty_profile_with_the_error() {
    let store = FakeStateStore::new();
    let metrics = InMemoryMetrics::new();
    store.fail(StoreOp::Write);

    let failure = coordinator(&store, &metrics)
        .create_match(MatchProfile::new("1v1", "{}"), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(
        failure.error,
        BackendError::StoreWrite { stage: "writing", .. }
    ));
    assert_eq!(failure.profile.id, "");
    assert!(failure.profile.error.contains("injected Write failure"));
    assert_eq!(store.mutations().len(), 1, "nothing is queued after a failed write");
    assert_eq!(metrics.get(OperationKind::CreateMatch, Counter::Errors), 1);
}

#[tokio::test]
async fn enqueue_failure_is_fatal() {
    let store = FakeStateStore::new();
    let metrics = InMemoryMetrics::new();
    store.fail(StoreOp::Enqueue);

    let failure = coordinator(&store, &metrics)
        .create_match(MatchProfile::new("1v1", "{}"), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(
        failure.error,
        BackendError::StoreWrite { stage: "queueing", .. }
    ));
    assert!(failure.profile.is_error());
    assert!(!store.calls().iter().any(|c| c.op() == StoreOp::Read));
}

#[tokio::test(start_paused = true)]
async fn times_out_without_a_worker() {
    let store = FakeStateStore::new();
    let metrics = InMemoryMetrics::new();
    let started = tokio::time::Instant::now();

    let failure = coordinator_with(&store, &metrics, JsonKeys::default(), steady_backoff(50, 300))
        .create_match(MatchProfile::new("1v1", "{}"), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(failure.error, BackendError::RendezvousTimeout { .. }));
    assert!(failure.profile.error.contains("backoff deadline exceeded"));
    assert!(failure.to_string().contains("backoff deadline exceeded"));
    assert!(started.elapsed() <= Duration::from_millis(300));
    assert_eq!(metrics.get(OperationKind::CreateMatch, Counter::Errors), 1);
}

#[tokio::test(start_paused = true)]
async fn cancellation_stops_the_watch() {
    let store = FakeStateStore::new();
    let metrics = InMemoryMetrics::new();
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(250)).await;
        trigger.cancel();
    });

    let started = tokio::time::Instant::now();
    let failure = coordinator_with(&store, &metrics, JsonKeys::default(), steady_backoff(10_000, 0))
        .create_match(MatchProfile::new("1v1", "{}"), &cancel)
        .await
        .unwrap_err();

    assert!(failure.is_cancelled());
    assert!(failure.profile.error.contains("cancelled"));
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn worker_error_is_surfaced_with_the_result() {
    let store = FakeStateStore::new();
    let metrics = InMemoryMetrics::new();
    spawn_worker(&store, |record| {
        record.insert(fields::ERROR.to_string(), "insufficient players".to_string());
    });

    let failure = coordinator(&store, &metrics)
        .create_match(MatchProfile::new("1v1", "{}"), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(failure.error, BackendError::WorkerReported(ref e) if e == "insufficient players"));
    assert_eq!(failure.profile.id, "1v1");
    assert_eq!(failure.profile.error, "insufficient players");
}

#[tokio::test(start_paused = true)]
async fn malformed_input_properties_fail_after_resolution() {
    let store = FakeStateStore::new();
    let metrics = InMemoryMetrics::new();
    let worker = spawn_worker(&store, |record| {
        record.insert(fields::PROPERTIES.to_string(), "{}".to_string());
    });

    let failure = coordinator(&store, &metrics)
        .create_match(MatchProfile::new("1v1", "{not json"), &CancellationToken::new())
        .await
        .unwrap_err();

    worker.await.unwrap();
    assert!(matches!(failure.error, BackendError::MalformedResult { .. }));
    assert_eq!(failure.profile.error, MALFORMED_PROPERTIES);
}

#[tokio::test(start_paused = true)]
async fn undecodable_result_is_malformed() {
    let store = FakeStateStore::new();
    let metrics = InMemoryMetrics::new();
    spawn_worker(&store, |record| {
        record.insert(fields::POOLS.to_string(), "[{".to_string());
    });

    let failure = coordinator(&store, &metrics)
        .create_match(MatchProfile::new("1v1", "{}"), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(failure.error, BackendError::MalformedResult { .. }));
    assert!(failure.profile.error.starts_with(MALFORMED_PROPERTIES));
}

#[tokio::test(start_paused = true)]
async fn legacy_pools_are_lifted_before_writing() {
    let store = FakeStateStore::new();
    let metrics = InMemoryMetrics::new();
    let keys = JsonKeys {
        pools: Some("legacy.pools".to_string()),
        rosters: None,
    };
    let properties = r#"{"legacy":{"pools":[{"name":"everyone","filters":[]}]}}"#;
    spawn_worker(&store, |_| {});

    let result = coordinator_with(&store, &metrics, keys, steady_backoff(100, 5_000))
        .create_match(MatchProfile::new("1v1", properties), &CancellationToken::new())
        .await
        .unwrap();

    let pools = result.pools.unwrap();
    assert_eq!(pools.len(), 1);
    assert_eq!(pools[0].name, "everyone");
}

#[tokio::test(start_paused = true)]
async fn every_call_uses_a_fresh_request_key() {
    let store = FakeStateStore::new();
    let metrics = InMemoryMetrics::new();
    let coordinator = coordinator(&store, &metrics);

    let first = spawn_worker(&store, |_| {});
    coordinator
        .create_match(MatchProfile::new("1v1", "{}"), &CancellationToken::new())
        .await
        .unwrap();
    let second = spawn_worker(&store, |_| {});
    coordinator
        .create_match(MatchProfile::new("1v1", "{}"), &CancellationToken::new())
        .await
        .unwrap();

    assert_ne!(first.await.unwrap(), second.await.unwrap());
}
