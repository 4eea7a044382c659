// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced store wrapper for consistent observability

use async_trait::async_trait;
use mb_core::BackoffPolicy;
use mb_storage::{Record, StateStore, StoreError, WatchOutcome};
use std::collections::HashMap;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Wrapper that adds tracing to any StateStore
#[derive(Clone)]
pub struct TracedStateStore<S> {
    inner: S,
}

impl<S> TracedStateStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

fn log_result<T>(result: &Result<T, StoreError>, elapsed: Duration, done: &str) {
    match result {
        Ok(_) => tracing::debug!(elapsed_ms = elapsed.as_millis() as u64, "{}", done),
        Err(e) => tracing::error!(
            elapsed_ms = elapsed.as_millis() as u64,
            error = %e,
            component = "statestorage",
            "store operation failed"
        ),
    }
}

#[async_trait]
impl<S: StateStore> StateStore for TracedStateStore<S> {
    async fn write(&self, key: &str, record: Record, ttl: Duration) -> Result<(), StoreError> {
        let span = tracing::info_span!("store.write", key, ttl_secs = ttl.as_secs());
        async {
            tracing::debug!(fields = record.len(), "writing");
            let start = std::time::Instant::now();
            let result = self.inner.write(key, record, ttl).await;
            log_result(&result, start.elapsed(), "written");
            result
        }
        .instrument(span)
        .await
    }

    async fn read(&self, key: &str) -> Result<Option<Record>, StoreError> {
        let result = self.inner.read(key).await;
        tracing::trace!(
            key,
            found = ?result.as_ref().map(|r| r.is_some()).ok(),
            "read"
        );
        result
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let span = tracing::info_span!("store.delete", key);
        async {
            let start = std::time::Instant::now();
            let result = self.inner.delete(key).await;
            log_result(&result, start.elapsed(), "deleted");
            result
        }
        .instrument(span)
        .await
    }

    async fn enqueue(&self, queue: &str, item: &str) -> Result<(), StoreError> {
        let span = tracing::info_span!("store.enqueue", queue, item);
        async {
            let start = std::time::Instant::now();
            let result = self.inner.enqueue(queue, item).await;
            log_result(&result, start.elapsed(), "queued");
            result
        }
        .instrument(span)
        .await
    }

    async fn dequeue(&self, queue: &str) -> Result<Option<String>, StoreError> {
        let result = self.inner.dequeue(queue).await;
        tracing::trace!(queue, item = ?result.as_ref().ok(), "dequeued");
        result
    }

    async fn update_fields(
        &self,
        values: &HashMap<String, String>,
        field: &str,
    ) -> Result<(), StoreError> {
        let span = tracing::info_span!("store.update_fields", field, count = values.len());
        async {
            let start = std::time::Instant::now();
            let result = self.inner.update_fields(values, field).await;
            log_result(&result, start.elapsed(), "fields updated");
            result
        }
        .instrument(span)
        .await
    }

    async fn delete_fields(&self, keys: &[String], field: &str) -> Result<(), StoreError> {
        let span = tracing::info_span!("store.delete_fields", field, count = keys.len());
        async {
            let start = std::time::Instant::now();
            let result = self.inner.delete_fields(keys, field).await;
            log_result(&result, start.elapsed(), "fields deleted");
            result
        }
        .instrument(span)
        .await
    }

    async fn move_membership(
        &self,
        ids: &[String],
        from: &str,
        to: &str,
    ) -> Result<(), StoreError> {
        let span = tracing::info_span!("store.move_membership", from, to, count = ids.len());
        async {
            let start = std::time::Instant::now();
            let result = self.inner.move_membership(ids, from, to).await;
            // a failed move is tolerated by callers, so warn rather than error
            match &result {
                Ok(()) => tracing::debug!(
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "membership moved"
                ),
                Err(e) => tracing::warn!(
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    error = %e,
                    "membership move failed"
                ),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn members(&self, list: &str) -> Result<Vec<String>, StoreError> {
        let result = self.inner.members(list).await;
        tracing::trace!(
            list,
            count = result.as_ref().map(|m| m.len()).ok(),
            "listed members"
        );
        result
    }

    async fn watch(
        &self,
        key: &str,
        field: &str,
        cancel: &CancellationToken,
        backoff: &BackoffPolicy,
    ) -> WatchOutcome {
        let span = tracing::info_span!("store.watch", key, field);
        async {
            tracing::info!(backoff = %backoff, "watching");
            let start = std::time::Instant::now();
            let outcome = self.inner.watch(key, field, cancel, backoff).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &outcome {
                WatchOutcome::Resolved(_) => tracing::info!(elapsed_ms, "resolved"),
                WatchOutcome::Cancelled => tracing::info!(elapsed_ms, "cancelled"),
                WatchOutcome::TimedOut => tracing::warn!(elapsed_ms, "backoff deadline exceeded"),
            }
            outcome
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
