// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! State storage for the match backend
//!
//! The [`StateStore`] trait is everything the backend needs from its shared
//! store: keyed records with a TTL, work queues, batch field updates,
//! membership lists, and a polling watch. Each call is atomic on its own;
//! nothing spans calls.

mod memory;
pub mod record;
pub mod watch;

pub use memory::MemoryStore;
pub use record::{decode_profile, encode_profile, Record, RecordError};
pub use watch::WatchOutcome;

use async_trait::async_trait;
use mb_core::BackoffPolicy;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors from store operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("state storage unavailable: {0}")]
    Unavailable(String),
    #[error("state storage rejected {op}: {reason}")]
    Rejected { op: &'static str, reason: String },
}

/// Shared store backing the backend
#[async_trait]
pub trait StateStore: Clone + Send + Sync + 'static {
    /// Replace the record at `key`. A zero `ttl` never expires.
    async fn write(&self, key: &str, record: Record, ttl: Duration) -> Result<(), StoreError>;

    /// Read the record at `key`, if present and not expired
    async fn read(&self, key: &str) -> Result<Option<Record>, StoreError>;

    /// Remove the record at `key`. Removing a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Push `item` onto the tail of `queue`
    async fn enqueue(&self, queue: &str, item: &str) -> Result<(), StoreError>;

    /// Pop the head of `queue`
    async fn dequeue(&self, queue: &str) -> Result<Option<String>, StoreError>;

    /// Set `field` on each record named by a key of `values`, in one step
    async fn update_fields(
        &self,
        values: &HashMap<String, String>,
        field: &str,
    ) -> Result<(), StoreError>;

    /// Remove `field` from each record in `keys`, in one step
    async fn delete_fields(&self, keys: &[String], field: &str) -> Result<(), StoreError>;

    /// Remove `ids` from list `from` and add them to list `to`, in one step
    async fn move_membership(&self, ids: &[String], from: &str, to: &str)
        -> Result<(), StoreError>;

    /// Members of `list`, oldest first
    async fn members(&self, list: &str) -> Result<Vec<String>, StoreError>;

    /// Wait until the record at `key` has a non-empty `field`.
    ///
    /// Polls on the backoff schedule. Read errors are retried on the same
    /// schedule. Stops early when `cancel` fires.
    async fn watch(
        &self,
        key: &str,
        field: &str,
        cancel: &CancellationToken,
        backoff: &BackoffPolicy,
    ) -> WatchOutcome {
        watch::poll_for_field(self, key, field, cancel, backoff).await
    }

    /// One field of one record; empty when either is missing
    async fn read_field(&self, key: &str, field: &str) -> Result<String, StoreError> {
        Ok(self
            .read(key)
            .await?
            .and_then(|mut record| record.remove(field))
            .unwrap_or_default())
    }
}
