// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! DeleteMatch

use crate::error::BackendError;
use mb_core::{Counter, MatchProfile, Metrics, OperationKind};
use mb_storage::StateStore;
use tracing::Instrument;

#[derive(Clone)]
pub struct MatchLifecycle<S, M> {
    store: S,
    metrics: M,
}

impl<S: StateStore, M: Metrics> MatchLifecycle<S, M> {
    pub fn new(store: S, metrics: M) -> Self {
        Self { store, metrics }
    }

    /// Delete the record keyed by `profile.id`
    pub async fn delete_match(&self, profile: &MatchProfile) -> Result<(), BackendError> {
        let op = OperationKind::DeleteMatch;
        let span = tracing::info_span!("delete_match", match_object_id = %profile.id);

        async {
            tracing::info!("call executing");
            match self.store.delete(&profile.id).await {
                Ok(()) => {
                    tracing::info!("match object deleted");
                    self.metrics.record(op, Counter::Requests, 1);
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(error = %e, component = "statestorage", "state storage error");
                    self.metrics.record(op, Counter::Errors, 1);
                    Err(BackendError::Deletion {
                        target: format!("match object {}", profile.id),
                        source: e,
                    })
                }
            }
        }
        .instrument(span)
        .await
    }
}
