// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backoff-driven polling of a single record

use crate::{Record, StateStore};
use mb_core::BackoffPolicy;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// How a watch ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchOutcome {
    /// The record became ready; carries the whole record
    Resolved(Record),
    /// The caller's token fired first
    Cancelled,
    /// The backoff schedule ran out of time
    TimedOut,
}

impl WatchOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, WatchOutcome::Resolved(_))
    }
}

/// Poll `key` until its `field` is non-empty, the token fires, or the
/// backoff gives up. Produces at most one record.
pub async fn poll_for_field<S: StateStore>(
    store: &S,
    key: &str,
    field: &str,
    cancel: &CancellationToken,
    policy: &BackoffPolicy,
) -> WatchOutcome {
    let started = Instant::now();
    let mut backoff = policy.start();
    let mut attempts = 0u32;

    loop {
        if cancel.is_cancelled() {
            return WatchOutcome::Cancelled;
        }

        attempts += 1;
        match store.read(key).await {
            Ok(Some(record)) if record.get(field).is_some_and(|v| !v.is_empty()) => {
                tracing::debug!(key, attempts, "watched record ready");
                return WatchOutcome::Resolved(record);
            }
            Ok(_) => tracing::trace!(key, attempts, "watched record not ready"),
            Err(e) => tracing::warn!(key, attempts, error = %e, "watch read failed, retrying"),
        }

        let Some(delay) = backoff.next_delay(started.elapsed()) else {
            tracing::debug!(key, attempts, "watch backoff exhausted");
            return WatchOutcome::TimedOut;
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return WatchOutcome::Cancelled,
            _ = tokio::time::sleep(delay) => {}
        }
    }
}
