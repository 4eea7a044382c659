// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mb-core: shared types for the match backend
//!
//! This crate provides:
//! - The match data model (profiles, rosters, players, assignments)
//! - Request key generation
//! - Exponential backoff policies and their string form
//! - Operation kinds and the metrics recording seam
//! - Service configuration

pub mod backoff;
pub mod config;
pub mod key;
pub mod metrics;
pub mod model;

pub use backoff::{Backoff, BackoffParseError, BackoffPolicy};
pub use config::{BackendConfig, ConfigError, JsonKeys, ListNames};
pub use key::{IdGen, RequestKey, SequentialIdGen, UuidIdGen};
pub use metrics::{Counter, InMemoryMetrics, Metrics, OperationKind, TracingMetrics};
pub use model::{Assignments, Filter, MatchProfile, OpResult, Player, PlayerPool, Roster};
