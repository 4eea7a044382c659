// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request keys and the unique id sources behind them

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Source of globally unique identifiers
pub trait IdGen: Clone + Send + Sync + 'static {
    fn next(&self) -> String;
}

/// Random v4 UUIDs in their compact hex form (no hyphens, so the id never
/// collides with the `.` separator of a request key)
#[derive(Clone, Default)]
pub struct UuidIdGen;

impl IdGen for UuidIdGen {
    fn next(&self) -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }
}

/// Predictable ids for tests: `<prefix>-1`, `<prefix>-2`, ...
#[derive(Clone)]
pub struct SequentialIdGen {
    prefix: String,
    counter: Arc<AtomicU64>,
}

impl SequentialIdGen {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl Default for SequentialIdGen {
    fn default() -> Self {
        Self::new("mo")
    }
}

impl IdGen for SequentialIdGen {
    fn next(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        format!("{}-{}", self.prefix, n)
    }
}

/// Key under which one CreateMatch call's record is stored and watched.
///
/// Format is `<unique-id>.<profile-id>`. Generated once per call and never
/// reused; the record behind it expires through the store TTL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    key: String,
    split: usize,
}

impl RequestKey {
    pub fn new(unique_id: &str, profile_id: &str) -> Self {
        Self {
            key: format!("{}.{}", unique_id, profile_id),
            split: unique_id.len(),
        }
    }

    /// Draw a fresh unique id from `ids` and bind it to `profile_id`
    pub fn generate<I: IdGen>(ids: &I, profile_id: &str) -> Self {
        Self::new(&ids.next(), profile_id)
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// The unique half of the key (the match object id)
    pub fn unique_id(&self) -> &str {
        &self.key[..self.split]
    }

    pub fn profile_id(&self) -> &str {
        &self.key[self.split + 1..]
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl AsRef<str> for RequestKey {
    fn as_ref(&self) -> &str {
        &self.key
    }
}

#[cfg(test)]
#[path = "key_tests.rs"]
mod tests;
