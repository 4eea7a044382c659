// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process state store

use crate::{Record, StateStore, StoreError};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug)]
struct Entry {
    record: Record,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

#[derive(Debug, Default)]
struct StoreState {
    records: HashMap<String, Entry>,
    queues: HashMap<String, VecDeque<String>>,
    /// list name -> member -> insertion sequence
    lists: HashMap<String, BTreeMap<String, u64>>,
    sequence: u64,
}

impl StoreState {
    fn live_record_mut(&mut self, key: &str, now: Instant) -> Option<&mut Record> {
        match self.records.get_mut(key) {
            Some(entry) if entry.is_live(now) => Some(&mut entry.record),
            _ => None,
        }
    }

    fn purge_expired(&mut self, now: Instant) {
        self.records.retain(|_, entry| entry.is_live(now));
    }
}

/// State store held in process memory.
///
/// Clones share the same data. Every operation takes one lock, which makes
/// each operation atomic with respect to the others.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Drop expired records; returns how many were removed
    pub fn purge_expired(&self) -> usize {
        let mut state = self.lock();
        let before = state.records.len();
        state.purge_expired(Instant::now());
        before - state.records.len()
    }

    /// Number of items waiting in `queue`
    pub fn queue_len(&self, queue: &str) -> usize {
        self.lock().queues.get(queue).map_or(0, VecDeque::len)
    }

    /// Add `ids` to `list` directly, the way the indexing side proposes
    /// players
    pub fn add_members(&self, list: &str, ids: &[&str]) {
        let mut state = self.lock();
        for id in ids {
            state.sequence += 1;
            let sequence = state.sequence;
            state
                .lists
                .entry(list.to_string())
                .or_default()
                .insert((*id).to_string(), sequence);
        }
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn write(&self, key: &str, record: Record, ttl: Duration) -> Result<(), StoreError> {
        let now = Instant::now();
        let expires_at = (!ttl.is_zero()).then(|| now + ttl);
        self.lock()
            .records
            .insert(key.to_string(), Entry { record, expires_at });
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Option<Record>, StoreError> {
        let now = Instant::now();
        let mut state = self.lock();
        Ok(state.live_record_mut(key, now).map(|r| r.clone()))
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.lock().records.remove(key);
        Ok(())
    }

    async fn enqueue(&self, queue: &str, item: &str) -> Result<(), StoreError> {
        self.lock()
            .queues
            .entry(queue.to_string())
            .or_default()
            .push_back(item.to_string());
        Ok(())
    }

    async fn dequeue(&self, queue: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .lock()
            .queues
            .get_mut(queue)
            .and_then(VecDeque::pop_front))
    }

    async fn update_fields(
        &self,
        values: &HashMap<String, String>,
        field: &str,
    ) -> Result<(), StoreError> {
        let now = Instant::now();
        let mut state = self.lock();
        for (key, value) in values {
            let entry = state.records.entry(key.clone()).or_insert_with(|| Entry {
                record: Record::new(),
                expires_at: None,
            });
            if !entry.is_live(now) {
                entry.record.clear();
                entry.expires_at = None;
            }
            entry.record.insert(field.to_string(), value.clone());
        }
        Ok(())
    }

    async fn delete_fields(&self, keys: &[String], field: &str) -> Result<(), StoreError> {
        let now = Instant::now();
        let mut state = self.lock();
        for key in keys {
            if let Some(record) = state.live_record_mut(key, now) {
                record.remove(field);
            }
        }
        Ok(())
    }

    async fn move_membership(
        &self,
        ids: &[String],
        from: &str,
        to: &str,
    ) -> Result<(), StoreError> {
        let mut state = self.lock();
        if let Some(source) = state.lists.get_mut(from) {
            for id in ids {
                source.remove(id);
            }
        }
        for id in ids {
            state.sequence += 1;
            let sequence = state.sequence;
            state
                .lists
                .entry(to.to_string())
                .or_default()
                .insert(id.clone(), sequence);
        }
        Ok(())
    }

    async fn members(&self, list: &str) -> Result<Vec<String>, StoreError> {
        let state = self.lock();
        let Some(members) = state.lists.get(list) else {
            return Ok(Vec::new());
        };
        let mut ordered: Vec<_> = members.iter().collect();
        ordered.sort_by_key(|(_, seq)| **seq);
        Ok(ordered.into_iter().map(|(id, _)| id.clone()).collect())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
