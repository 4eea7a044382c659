// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Match backend daemon library
//!
//! Exposes the wire protocol for clients, and the server pieces `mbd` is
//! built from.

pub mod lifecycle;
pub mod protocol;
pub mod server;

pub use lifecycle::{Config, DaemonBackend, LifecycleError};
pub use protocol::{ProtocolError, Request, Response};
pub use server::{handle_connection, serve, ServerError};
