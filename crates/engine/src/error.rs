// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the backend operations

use mb_core::MatchProfile;
use mb_storage::StoreError;
use thiserror::Error;

/// Why the watch on a request key stopped without a result
pub const WATCH_CANCELLED: &str = "watch stopped: context cancelled";
pub const WATCH_DEADLINE: &str = "watch stopped: backoff deadline exceeded";
/// Reported when the request's properties are not valid JSON
pub const MALFORMED_PROPERTIES: &str = "retrieved properties json was malformed";

/// Errors that can occur serving a backend call
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("state storage failure {stage} {key}: {source}")]
    StoreWrite {
        stage: &'static str,
        key: String,
        #[source]
        source: StoreError,
    },
    #[error("state storage failure reading {key}: {source}")]
    StoreRead {
        key: String,
        #[source]
        source: StoreError,
    },
    #[error("error retrieving matchmaking results for {key}: watch stopped: backoff deadline exceeded")]
    RendezvousTimeout { key: String },
    #[error("error retrieving matchmaking results for {key}: watch stopped: context cancelled")]
    RendezvousCancelled { key: String },
    #[error("{reason}")]
    MalformedResult { key: String, reason: String },
    #[error("{0}")]
    WorkerReported(String),
    #[error("error writing assignments: {0}")]
    AssignmentWrite(#[source] StoreError),
    #[error("error deleting {target}: {source}")]
    Deletion {
        target: String,
        #[source]
        source: StoreError,
    },
}

/// A failed CreateMatch, with whatever partial profile was available.
///
/// `profile.error` always holds a non-empty, human readable cause.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct MatchFailure {
    pub profile: MatchProfile,
    pub error: BackendError,
}

impl MatchFailure {
    pub(crate) fn new(mut profile: MatchProfile, error: BackendError) -> Self {
        if profile.error.is_empty() {
            profile.error = error.to_string();
        }
        Self { profile, error }
    }

    /// True when the failure came from the caller's own cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self.error, BackendError::RendezvousCancelled { .. })
    }
}
