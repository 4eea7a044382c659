// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CreateMatch: write the profile, queue it, wait for a worker's result

use crate::error::{BackendError, MatchFailure, MALFORMED_PROPERTIES, WATCH_CANCELLED, WATCH_DEADLINE};
use mb_adapters::{LegacyShim, PropertyConverter};
use mb_core::{BackoffPolicy, Counter, IdGen, MatchProfile, Metrics, OperationKind, RequestKey};
use mb_storage::record::fields;
use mb_storage::{decode_profile, encode_profile, StateStore, StoreError, WatchOutcome};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Settings for the request rendezvous
#[derive(Debug, Clone)]
pub struct RequestSettings {
    /// Work queue that request keys are pushed onto
    pub queue: String,
    /// TTL of the written record
    pub ttl: Duration,
    pub backoff: BackoffPolicy,
}

/// Runs the write, enqueue, watch rendezvous for a single profile
#[derive(Clone)]
pub struct RequestCoordinator<S, I, M, C> {
    store: S,
    ids: I,
    metrics: M,
    shim: LegacyShim<C>,
    settings: RequestSettings,
}

impl<S, I, M, C> RequestCoordinator<S, I, M, C>
where
    S: StateStore,
    I: IdGen,
    M: Metrics,
    C: PropertyConverter,
{
    pub fn new(store: S, ids: I, metrics: M, shim: LegacyShim<C>, settings: RequestSettings) -> Self {
        Self {
            store,
            ids,
            metrics,
            shim,
            settings,
        }
    }

    pub fn settings(&self) -> &RequestSettings {
        &self.settings
    }

    /// Submit `profile` and wait for the worker to fill it in.
    ///
    /// On failure the returned [`MatchFailure`] carries a profile whose
    /// `error` field explains what went wrong.
    pub async fn create_match(
        &self,
        profile: MatchProfile,
        cancel: &CancellationToken,
    ) -> Result<MatchProfile, MatchFailure> {
        self.create_match_as(OperationKind::CreateMatch, profile, cancel)
            .await
    }

    /// As [`RequestCoordinator::create_match`], with metrics tagged as `op`
    pub(crate) async fn create_match_as(
        &self,
        op: OperationKind,
        mut profile: MatchProfile,
        cancel: &CancellationToken,
    ) -> Result<MatchProfile, MatchFailure> {
        self.shim.apply(&mut profile);

        let key = RequestKey::generate(&self.ids, &profile.id);
        let span = tracing::info_span!(
            "create_match",
            method = %op,
            profile_id = %profile.id,
            request_key = %key,
            match_object_id = key.unique_id(),
        );

        async {
            tracing::info!("call executing");
            let result = self.rendezvous(&key, &profile, cancel).await;
            match &result {
                Ok(_) => {
                    tracing::info!("matchmaking results received");
                    self.metrics.record(op, Counter::Requests, 1);
                }
                Err(failure) => {
                    tracing::warn!(error = %failure.error, "create match failed");
                    self.metrics.record(op, Counter::Errors, 1);
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn rendezvous(
        &self,
        key: &RequestKey,
        profile: &MatchProfile,
        cancel: &CancellationToken,
    ) -> Result<MatchProfile, MatchFailure> {
        let store_failure = |stage: &'static str, source: StoreError| {
            tracing::error!(
                error = %source,
                component = "statestorage",
                "state storage failure {} profile",
                stage
            );
            let error = BackendError::StoreWrite {
                stage,
                key: key.to_string(),
                source,
            };
            MatchFailure::new(MatchProfile::failed(error.to_string()), error)
        };

        let record = encode_profile(profile).map_err(|e| {
            store_failure(
                "writing",
                StoreError::Rejected {
                    op: "write",
                    reason: e.to_string(),
                },
            )
        })?;
        self.store
            .write(key.as_str(), record, self.settings.ttl)
            .await
            .map_err(|e| store_failure("writing", e))?;
        tracing::info!("profile written to state storage");

        self.store
            .enqueue(&self.settings.queue, key.as_str())
            .await
            .map_err(|e| store_failure("queueing", e))?;
        tracing::info!(queue = %self.settings.queue, "profile added to processing queue");

        let record = match self
            .store
            .watch(key.as_str(), fields::STATUS, cancel, &self.settings.backoff)
            .await
        {
            WatchOutcome::Resolved(record) => record,
            WatchOutcome::Cancelled => {
                return Err(MatchFailure::new(
                    MatchProfile::failed(WATCH_CANCELLED),
                    BackendError::RendezvousCancelled {
                        key: key.to_string(),
                    },
                ))
            }
            WatchOutcome::TimedOut => {
                return Err(MatchFailure::new(
                    MatchProfile::failed(WATCH_DEADLINE),
                    BackendError::RendezvousTimeout {
                        key: key.to_string(),
                    },
                ))
            }
        };

        let mut result = decode_profile(&record).map_err(|e| {
            let reason = format!("{}: {}", MALFORMED_PROPERTIES, e);
            MatchFailure::new(
                MatchProfile::failed(reason.clone()),
                BackendError::MalformedResult {
                    key: key.to_string(),
                    reason,
                },
            )
        })?;

        // Legacy: this checks the submitted properties, not the result's.
        if serde_json::from_str::<serde_json::Value>(&profile.properties).is_err() {
            result.error = MALFORMED_PROPERTIES.to_string();
            let error = BackendError::MalformedResult {
                key: key.to_string(),
                reason: MALFORMED_PROPERTIES.to_string(),
            };
            return Err(MatchFailure::new(result, error));
        }

        if result.is_error() {
            let error = BackendError::WorkerReported(result.error.clone());
            return Err(MatchFailure::new(result, error));
        }

        Ok(result)
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
