// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ListMatches: CreateMatch in a loop until the caller goes away

use crate::error::MatchFailure;
use crate::request::RequestCoordinator;
use async_trait::async_trait;
use mb_adapters::PropertyConverter;
use mb_core::{Counter, IdGen, MatchProfile, Metrics, OperationKind};
use mb_storage::StateStore;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// The receiving end of a stream went away
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("match sink closed")]
pub struct SinkClosed;

/// Where streamed matches are delivered
#[async_trait]
pub trait MatchSink: Send {
    async fn send(&mut self, profile: MatchProfile) -> Result<(), SinkClosed>;
}

#[async_trait]
impl MatchSink for mpsc::Sender<MatchProfile> {
    async fn send(&mut self, profile: MatchProfile) -> Result<(), SinkClosed> {
        mpsc::Sender::send(self, profile).await.map_err(|_| SinkClosed)
    }
}

/// How a stream ended without error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    Cancelled,
    SinkClosed,
}

/// Summary of a stream that stopped cleanly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSummary {
    pub emitted: u64,
    pub end: StreamEnd,
}

#[derive(Clone)]
pub struct StreamCoordinator<S, I, M, C> {
    requests: RequestCoordinator<S, I, M, C>,
    metrics: M,
    interval: Duration,
}

impl<S, I, M, C> StreamCoordinator<S, I, M, C>
where
    S: StateStore,
    I: IdGen,
    M: Metrics,
    C: PropertyConverter,
{
    pub fn new(requests: RequestCoordinator<S, I, M, C>, metrics: M, interval: Duration) -> Self {
        Self {
            requests,
            metrics,
            interval,
        }
    }

    /// Keep filling copies of `template` and emitting them to `sink`.
    ///
    /// At most one CreateMatch is in flight. Between results the loop pauses
    /// for the stream interval, which gives the caller a window to hang up.
    /// Cancellation or a closed sink ends the stream cleanly; the first
    /// failed CreateMatch ends it with that failure.
    pub async fn list_matches<K: MatchSink>(
        &self,
        template: &MatchProfile,
        sink: &mut K,
        cancel: &CancellationToken,
    ) -> Result<StreamSummary, MatchFailure> {
        let op = OperationKind::ListMatches;
        let span = tracing::info_span!("list_matches", profile_id = %template.id);

        async {
            tracing::info!("streaming matches until cancelled");
            let mut emitted = 0u64;

            let end = loop {
                if cancel.is_cancelled() {
                    tracing::info!(emitted, "stream cancelled; client is finished receiving matches");
                    break StreamEnd::Cancelled;
                }

                let result = self
                    .requests
                    .create_match_as(op, template.clone(), cancel)
                    .await;

                let profile = match result {
                    Ok(profile) => profile,
                    Err(failure) if failure.is_cancelled() && cancel.is_cancelled() => continue,
                    Err(failure) => {
                        tracing::error!(error = %failure, "failure calling create match");
                        self.metrics.record(op, Counter::Errors, 1);
                        return Err(failure);
                    }
                };

                if cancel.is_cancelled() {
                    continue;
                }

                tracing::debug!(match_id = %profile.id, "streaming back match object");
                if sink.send(profile).await.is_err() {
                    tracing::info!(emitted, "stream receiver closed");
                    break StreamEnd::SinkClosed;
                }
                emitted += 1;

                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {}
                    _ = tokio::time::sleep(self.interval) => {}
                }
            };

            self.metrics.record(op, Counter::Requests, 1);
            Ok(StreamSummary { emitted, end })
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "stream_tests.rs"]
mod tests;
