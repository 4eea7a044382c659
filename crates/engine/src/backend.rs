// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The backend API surface

use crate::assignment::AssignmentCoordinator;
use crate::error::{BackendError, MatchFailure};
use crate::lifecycle::MatchLifecycle;
use crate::request::{RequestCoordinator, RequestSettings};
use crate::stream::{MatchSink, StreamCoordinator, StreamSummary};
use crate::worker::{ClaimedRequest, WorkQueue};
use mb_adapters::{JsonPathConverter, LegacyShim, PropertyConverter};
use mb_core::{Assignments, BackendConfig, IdGen, MatchProfile, Metrics, Roster};
use mb_storage::StateStore;
use tokio_util::sync::CancellationToken;

/// Adapter dependencies of the backend
pub struct BackendDeps<S, I, M> {
    pub store: S,
    pub ids: I,
    pub metrics: M,
}

/// Every backend operation, sharing one store
#[derive(Clone)]
pub struct Backend<S, I, M, C = JsonPathConverter> {
    requests: RequestCoordinator<S, I, M, C>,
    streams: StreamCoordinator<S, I, M, C>,
    assignments: AssignmentCoordinator<S, M>,
    matches: MatchLifecycle<S, M>,
    work: WorkQueue<S>,
}

impl<S, I, M> Backend<S, I, M, JsonPathConverter>
where
    S: StateStore,
    I: IdGen,
    M: Metrics,
{
    pub fn new(deps: BackendDeps<S, I, M>, config: &BackendConfig) -> Self {
        Self::with_converter(deps, JsonPathConverter, config)
    }
}

impl<S, I, M, C> Backend<S, I, M, C>
where
    S: StateStore,
    I: IdGen,
    M: Metrics,
    C: PropertyConverter,
{
    pub fn with_converter(deps: BackendDeps<S, I, M>, converter: C, config: &BackendConfig) -> Self {
        let BackendDeps { store, ids, metrics } = deps;
        let settings = RequestSettings {
            queue: config.queue.clone(),
            ttl: config.match_object_ttl,
            backoff: config.backoff_policy(),
        };
        let requests = RequestCoordinator::new(
            store.clone(),
            ids,
            metrics.clone(),
            LegacyShim::new(converter, config.json_keys.clone()),
            settings,
        );
        Self {
            streams: StreamCoordinator::new(requests.clone(), metrics.clone(), config.stream_interval),
            requests,
            assignments: AssignmentCoordinator::new(store.clone(), metrics.clone(), config.lists.clone()),
            matches: MatchLifecycle::new(store.clone(), metrics),
            work: WorkQueue::new(store, config.queue.clone(), config.match_object_ttl),
        }
    }

    pub async fn create_match(
        &self,
        profile: MatchProfile,
        cancel: &CancellationToken,
    ) -> Result<MatchProfile, MatchFailure> {
        self.requests.create_match(profile, cancel).await
    }

    pub async fn list_matches<K: MatchSink>(
        &self,
        template: &MatchProfile,
        sink: &mut K,
        cancel: &CancellationToken,
    ) -> Result<StreamSummary, MatchFailure> {
        self.streams.list_matches(template, sink, cancel).await
    }

    pub async fn delete_match(&self, profile: &MatchProfile) -> Result<(), BackendError> {
        self.matches.delete_match(profile).await
    }

    pub async fn create_assignments(&self, request: &Assignments) -> Result<(), BackendError> {
        self.assignments.create_assignments(request).await
    }

    pub async fn delete_assignments(&self, roster: &Roster) -> Result<(), BackendError> {
        self.assignments.delete_assignments(roster).await
    }

    /// Worker side: take the oldest pending request
    pub async fn claim_request(&self) -> Result<Option<ClaimedRequest>, BackendError> {
        self.work.claim().await
    }

    /// Worker side: publish the result for a claimed request
    pub async fn complete_request(&self, key: &str, result: &MatchProfile) -> Result<(), BackendError> {
        self.work.complete(key, result).await
    }
}
