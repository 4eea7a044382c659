// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operation kinds and counter recording

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

/// The backend calls, used to tag logs and counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    CreateMatch,
    ListMatches,
    DeleteMatch,
    CreateAssignments,
    DeleteAssignments,
}

impl OperationKind {
    pub fn name(&self) -> &'static str {
        match self {
            OperationKind::CreateMatch => "CreateMatch",
            OperationKind::ListMatches => "ListMatches",
            OperationKind::DeleteMatch => "DeleteMatch",
            OperationKind::CreateAssignments => "CreateAssignments",
            OperationKind::DeleteAssignments => "DeleteAssignments",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Counters recorded by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    /// Calls that completed
    Requests,
    /// Calls that failed
    Errors,
    /// Players given an assignment
    Assignments,
    /// Players whose assignment write failed
    AssignmentFailures,
    /// Players whose assignment was cleared
    AssignmentDeletions,
    /// Players whose assignment clear failed
    AssignmentDeletionFailures,
}

impl Counter {
    pub fn name(&self) -> &'static str {
        match self {
            Counter::Requests => "backend/requests",
            Counter::Errors => "backend/errors",
            Counter::Assignments => "backend/assignments",
            Counter::AssignmentFailures => "backend/assignment_failures",
            Counter::AssignmentDeletions => "backend/assignment_deletions",
            Counter::AssignmentDeletionFailures => "backend/assignment_deletion_failures",
        }
    }
}

/// Sink for backend counters
pub trait Metrics: Clone + Send + Sync + 'static {
    fn record(&self, op: OperationKind, counter: Counter, value: u64);
}

/// Emits every measurement as a structured `tracing` event
#[derive(Clone, Default)]
pub struct TracingMetrics;

impl Metrics for TracingMetrics {
    fn record(&self, op: OperationKind, counter: Counter, value: u64) {
        tracing::debug!(
            target: "mb::metrics",
            method = op.name(),
            metric = counter.name(),
            value,
        );
    }
}

/// Accumulates counters in memory, keyed by operation and counter
#[derive(Clone, Default)]
pub struct InMemoryMetrics {
    counts: Arc<Mutex<HashMap<(OperationKind, Counter), u64>>>,
}

impl InMemoryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, op: OperationKind, counter: Counter) -> u64 {
        self.counts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&(op, counter))
            .copied()
            .unwrap_or(0)
    }
}

impl Metrics for InMemoryMetrics {
    fn record(&self, op: OperationKind, counter: Counter, value: u64) {
        *self
            .counts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry((op, counter))
            .or_insert(0) += value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_metrics_accumulate_per_operation() {
        let metrics = InMemoryMetrics::new();
        metrics.record(OperationKind::CreateAssignments, Counter::Assignments, 2);
        metrics.record(OperationKind::CreateAssignments, Counter::Assignments, 3);
        metrics.record(OperationKind::DeleteAssignments, Counter::Assignments, 7);

        assert_eq!(
            metrics.get(OperationKind::CreateAssignments, Counter::Assignments),
            5
        );
        assert_eq!(
            metrics.get(OperationKind::DeleteAssignments, Counter::Assignments),
            7
        );
        assert_eq!(metrics.get(OperationKind::CreateMatch, Counter::Errors), 0);
    }

    #[test]
    fn clones_share_counts() {
        let metrics = InMemoryMetrics::new();
        metrics
            .clone()
            .record(OperationKind::CreateMatch, Counter::Requests, 1);
        assert_eq!(metrics.get(OperationKind::CreateMatch, Counter::Requests), 1);
    }

    #[test]
    fn operation_names_match_rpc_methods() {
        assert_eq!(OperationKind::ListMatches.to_string(), "ListMatches");
        assert_eq!(OperationKind::DeleteAssignments.name(), "DeleteAssignments");
    }
}
