// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake state store for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use async_trait::async_trait;
use mb_storage::{MemoryStore, Record, StateStore, StoreError};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Store operation kinds, for fault injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Write,
    Read,
    Delete,
    Enqueue,
    Dequeue,
    UpdateFields,
    DeleteFields,
    MoveMembership,
    Members,
}

/// Recorded store call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Write { key: String, ttl: Duration },
    Read { key: String },
    Delete { key: String },
    Enqueue { queue: String, item: String },
    Dequeue { queue: String },
    UpdateFields { values: HashMap<String, String>, field: String },
    DeleteFields { keys: Vec<String>, field: String },
    MoveMembership { ids: Vec<String>, from: String, to: String },
    Members { list: String },
}

impl StoreCall {
    pub fn op(&self) -> StoreOp {
        match self {
            StoreCall::Write { .. } => StoreOp::Write,
            StoreCall::Read { .. } => StoreOp::Read,
            StoreCall::Delete { .. } => StoreOp::Delete,
            StoreCall::Enqueue { .. } => StoreOp::Enqueue,
            StoreCall::Dequeue { .. } => StoreOp::Dequeue,
            StoreCall::UpdateFields { .. } => StoreOp::UpdateFields,
            StoreCall::DeleteFields { .. } => StoreOp::DeleteFields,
            StoreCall::MoveMembership { .. } => StoreOp::MoveMembership,
            StoreCall::Members { .. } => StoreOp::Members,
        }
    }
}

/// Memory-backed store that records calls and fails on demand.
///
/// Reads are recorded too, so a watch shows up as a run of `Read` calls.
#[derive(Clone, Default)]
pub struct FakeStateStore {
    inner: MemoryStore,
    calls: Arc<Mutex<Vec<StoreCall>>>,
    failing: Arc<Mutex<HashSet<StoreOp>>>,
}

impl FakeStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The backing memory store, for seeding data or playing the worker
    pub fn memory(&self) -> &MemoryStore {
        &self.inner
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Recorded calls, excluding reads
    pub fn mutations(&self) -> Vec<StoreCall> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c.op(), StoreOp::Read | StoreOp::Members | StoreOp::Dequeue))
            .collect()
    }

    /// Make every future `op` fail until [`FakeStateStore::heal`]
    pub fn fail(&self, op: StoreOp) {
        self.failing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(op);
    }

    pub fn heal(&self, op: StoreOp) {
        self.failing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&op);
    }

    fn record(&self, call: StoreCall) -> Result<(), StoreError> {
        let op = call.op();
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
        let failing = self
            .failing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&op);
        if failing {
            return Err(StoreError::Unavailable(format!("injected {:?} failure", op)));
        }
        Ok(())
    }
}

#[async_trait]
impl StateStore for FakeStateStore {
    async fn write(&self, key: &str, record: Record, ttl: Duration) -> Result<(), StoreError> {
        self.record(StoreCall::Write {
            key: key.to_string(),
            ttl,
        })?;
        self.inner.write(key, record, ttl).await
    }

    async fn read(&self, key: &str) -> Result<Option<Record>, StoreError> {
        self.record(StoreCall::Read {
            key: key.to_string(),
        })?;
        self.inner.read(key).await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.record(StoreCall::Delete {
            key: key.to_string(),
        })?;
        self.inner.delete(key).await
    }

    async fn enqueue(&self, queue: &str, item: &str) -> Result<(), StoreError> {
        self.record(StoreCall::Enqueue {
            queue: queue.to_string(),
            item: item.to_string(),
        })?;
        self.inner.enqueue(queue, item).await
    }

    async fn dequeue(&self, queue: &str) -> Result<Option<String>, StoreError> {
        self.record(StoreCall::Dequeue {
            queue: queue.to_string(),
        })?;
        self.inner.dequeue(queue).await
    }

    async fn update_fields(
        &self,
        values: &HashMap<String, String>,
        field: &str,
    ) -> Result<(), StoreError> {
        self.record(StoreCall::UpdateFields {
            values: values.clone(),
            field: field.to_string(),
        })?;
        self.inner.update_fields(values, field).await
    }

    async fn delete_fields(&self, keys: &[String], field: &str) -> Result<(), StoreError> {
        self.record(StoreCall::DeleteFields {
            keys: keys.to_vec(),
            field: field.to_string(),
        })?;
        self.inner.delete_fields(keys, field).await
    }

    async fn move_membership(
        &self,
        ids: &[String],
        from: &str,
        to: &str,
    ) -> Result<(), StoreError> {
        self.record(StoreCall::MoveMembership {
            ids: ids.to_vec(),
            from: from.to_string(),
            to: to.to_string(),
        })?;
        self.inner.move_membership(ids, from, to).await
    }

    async fn members(&self, list: &str) -> Result<Vec<String>, StoreError> {
        self.record(StoreCall::Members {
            list: list.to_string(),
        })?;
        self.inner.members(list).await
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
