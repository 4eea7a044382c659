// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The worker side of the request queue

use crate::error::BackendError;
use mb_core::MatchProfile;
use mb_storage::record::fields;
use mb_storage::{decode_profile, encode_profile, StateStore, StoreError};
use std::time::Duration;

/// A request taken off the queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimedRequest {
    pub key: String,
    pub profile: MatchProfile,
}

/// Lets a matchmaking worker take pending requests and hand back results
#[derive(Clone)]
pub struct WorkQueue<S> {
    store: S,
    queue: String,
    ttl: Duration,
}

impl<S: StateStore> WorkQueue<S> {
    pub fn new(store: S, queue: impl Into<String>, ttl: Duration) -> Self {
        Self {
            store,
            queue: queue.into(),
            ttl,
        }
    }

    /// Pop the oldest pending request. Keys whose record already expired are
    /// skipped.
    pub async fn claim(&self) -> Result<Option<ClaimedRequest>, BackendError> {
        loop {
            let Some(key) = self
                .store
                .dequeue(&self.queue)
                .await
                .map_err(|source| read_failure(&self.queue, source))?
            else {
                return Ok(None);
            };

            let Some(record) = self
                .store
                .read(&key)
                .await
                .map_err(|source| read_failure(&key, source))?
            else {
                tracing::debug!(request_key = %key, "queued request expired, skipping");
                continue;
            };

            let profile = decode_profile(&record).map_err(|e| BackendError::MalformedResult {
                key: key.clone(),
                reason: e.to_string(),
            })?;
            return Ok(Some(ClaimedRequest { key, profile }));
        }
    }

    /// Store `result` under `key` and mark it done, which releases the
    /// waiting CreateMatch call
    pub async fn complete(&self, key: &str, result: &MatchProfile) -> Result<(), BackendError> {
        let write_failure = |source| BackendError::StoreWrite {
            stage: "completing",
            key: key.to_string(),
            source,
        };
        let mut record = encode_profile(result).map_err(|e| {
            write_failure(StoreError::Rejected {
                op: "write",
                reason: e.to_string(),
            })
        })?;
        record.insert(fields::STATUS.to_string(), "done".to_string());
        self.store
            .write(key, record, self.ttl)
            .await
            .map_err(write_failure)?;
        tracing::info!(request_key = %key, "match result written");
        Ok(())
    }
}

fn read_failure(key: &str, source: StoreError) -> BackendError {
    BackendError::StoreRead {
        key: key.to_string(),
        source,
    }
}
