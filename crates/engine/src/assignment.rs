// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CreateAssignments and DeleteAssignments

use crate::error::BackendError;
use mb_core::{Assignments, Counter, ListNames, Metrics, OperationKind, Roster};
use mb_storage::record::fields;
use mb_storage::StateStore;
use std::collections::HashMap;
use tracing::Instrument;

/// Who gets which assignment, derived from an [`Assignments`] request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentPlan {
    /// Player id to effective assignment
    pub assignments: HashMap<String, String>,
    /// Every player id seen, one entry per occurrence
    pub player_ids: Vec<String>,
}

/// A player's own assignment wins over the request's default. Players without
/// an id are skipped entirely.
pub fn plan_assignments(request: &Assignments) -> AssignmentPlan {
    let mut plan = AssignmentPlan::default();
    for roster in &request.rosters {
        for player in roster.players.iter().filter(|p| !p.id.is_empty()) {
            let assignment = if player.assignment.is_empty() {
                &request.assignment
            } else {
                &player.assignment
            };
            tracing::debug!(player_id = %player.id, assignment = %assignment, "planned assignment");
            plan.assignments
                .insert(player.id.clone(), assignment.clone());
        }
        plan.player_ids.extend(roster.player_ids());
    }
    plan
}

#[derive(Clone)]
pub struct AssignmentCoordinator<S, M> {
    store: S,
    metrics: M,
    lists: ListNames,
}

impl<S: StateStore, M: Metrics> AssignmentCoordinator<S, M> {
    pub fn new(store: S, metrics: M, lists: ListNames) -> Self {
        Self {
            store,
            metrics,
            lists,
        }
    }

    /// Write each player's assignment, then move the players from the
    /// proposed list to the claimed list.
    ///
    /// The move is attempted even when the write failed, and its own failure
    /// is only logged.
    pub async fn create_assignments(&self, request: &Assignments) -> Result<(), BackendError> {
        let op = OperationKind::CreateAssignments;
        let plan = plan_assignments(request);
        let count = plan.assignments.len() as u64;
        let span = tracing::info_span!("create_assignments", num_assignments = count);

        async {
            tracing::info!("call executing");
            let written = self
                .store
                .update_fields(&plan.assignments, fields::ASSIGNMENT)
                .await;

            if let Err(e) = self
                .store
                .move_membership(&plan.player_ids, &self.lists.proposed, &self.lists.claimed)
                .await
            {
                tracing::warn!(
                    error = %e,
                    from = %self.lists.proposed,
                    to = %self.lists.claimed,
                    "failed to move assigned players between lists"
                );
            }

            match written {
                Ok(()) => {
                    tracing::info!(num_players = count, "assignments complete");
                    self.metrics.record(op, Counter::Requests, 1);
                    self.metrics.record(op, Counter::Assignments, count);
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(error = %e, component = "statestorage", "state storage error");
                    self.metrics.record(op, Counter::Errors, 1);
                    self.metrics.record(op, Counter::AssignmentFailures, count);
                    Err(BackendError::AssignmentWrite(e))
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Clear the assignment of every player in `roster`
    pub async fn delete_assignments(&self, roster: &Roster) -> Result<(), BackendError> {
        let op = OperationKind::DeleteAssignments;
        let ids = roster.player_ids();
        let count = ids.len() as u64;
        let span = tracing::info_span!("delete_assignments", roster = %roster.name, num_assignments = count);

        async {
            tracing::info!("call executing");
            match self.store.delete_fields(&ids, fields::ASSIGNMENT).await {
                Ok(()) => {
                    self.metrics.record(op, Counter::Requests, 1);
                    self.metrics.record(op, Counter::AssignmentDeletions, count);
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(error = %e, component = "statestorage", "state storage error");
                    self.metrics.record(op, Counter::Errors, 1);
                    self.metrics
                        .record(op, Counter::AssignmentDeletionFailures, count);
                    Err(BackendError::Deletion {
                        target: format!("assignments of roster {:?}", roster.name),
                        source: e,
                    })
                }
            }
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "assignment_tests.rs"]
mod tests;
