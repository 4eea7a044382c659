// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Match backend coordination
//!
//! Requests are handed to matchmaking workers through the state store: the
//! profile is written under a fresh request key, the key is queued, and the
//! call waits until a worker marks the record done.

mod assignment;
mod backend;
mod error;
mod lifecycle;
mod request;
mod stream;
mod worker;

pub use assignment::{plan_assignments, AssignmentCoordinator, AssignmentPlan};
pub use backend::{Backend, BackendDeps};
pub use error::{BackendError, MatchFailure, MALFORMED_PROPERTIES, WATCH_CANCELLED, WATCH_DEADLINE};
pub use lifecycle::MatchLifecycle;
pub use request::{RequestCoordinator, RequestSettings};
pub use stream::{MatchSink, SinkClosed, StreamCoordinator, StreamEnd, StreamSummary};
pub use worker::{ClaimedRequest, WorkQueue};
