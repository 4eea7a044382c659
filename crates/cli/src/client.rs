// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon client for CLI commands

use std::time::Duration;

use mb_core::{Assignments, MatchProfile, OpResult, Roster};
use mb_daemon::protocol::{self, ProtocolError};
use mb_daemon::{Request, Response};
use thiserror::Error;
use tokio::net::TcpStream;

// Timeout configuration (env vars in milliseconds)
fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Timeout for connecting and for quick requests (ping, assignments, delete)
pub fn timeout_ipc() -> Duration {
    parse_duration_ms("MB_TIMEOUT_IPC_MS").unwrap_or(Duration::from_secs(5))
}

/// Timeout for a single match to come back. Covers the daemon's default
/// watch deadline with some slack.
pub fn timeout_match() -> Duration {
    parse_duration_ms("MB_TIMEOUT_MATCH_MS").unwrap_or(Duration::from_secs(6 * 60))
}

/// Client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Could not connect to daemon at {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Connection timeout reaching daemon at {0}")]
    ConnectTimeout(String),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("{message}")]
    MatchFailed {
        message: String,
        profile: MatchProfile,
    },

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Unexpected response from daemon")]
    UnexpectedResponse,
}

/// Client for one `mbd` instance. Every call opens its own connection.
pub struct MatchClient {
    addr: String,
}

impl MatchClient {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }

    /// Connect and write `request`, returning the open stream
    async fn open(&self, request: &Request) -> Result<TcpStream, ClientError> {
        let mut stream = tokio::time::timeout(timeout_ipc(), TcpStream::connect(&self.addr))
            .await
            .map_err(|_| ClientError::ConnectTimeout(self.addr.clone()))?
            .map_err(|source| ClientError::Connect {
                addr: self.addr.clone(),
                source,
            })?;
        protocol::write_request(&mut stream, request, timeout_ipc()).await?;
        tracing::debug!(addr = %self.addr, ?request, "request sent");
        Ok(stream)
    }

    async fn send_with_timeout(
        &self,
        request: Request,
        read_timeout: Duration,
    ) -> Result<Response, ClientError> {
        let mut stream = self.open(&request).await?;
        let response = tokio::time::timeout(read_timeout, protocol::read_response(&mut stream))
            .await
            .map_err(|_| ProtocolError::Timeout)??;
        Ok(response)
    }

    /// Send a request and receive a response
    pub async fn send(&self, request: Request) -> Result<Response, ClientError> {
        self.send_with_timeout(request, timeout_ipc()).await
    }

    pub async fn ping(&self) -> Result<(), ClientError> {
        match self.send(Request::Ping).await? {
            Response::Pong => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// Submit a profile and wait for the worker's match
    pub async fn create_match(&self, profile: MatchProfile) -> Result<MatchProfile, ClientError> {
        let response = self
            .send_with_timeout(Request::CreateMatch { profile }, timeout_match())
            .await?;
        match response {
            Response::Match { profile } => Ok(profile),
            other => Err(unexpected(other)),
        }
    }

    /// Stream matches for `template`, calling `on_match` for each one, until
    /// the daemon ends the stream. Dropping the returned future hangs up,
    /// which stops the stream on the daemon side.
    pub async fn list_matches<F>(
        &self,
        template: MatchProfile,
        mut on_match: F,
    ) -> Result<u64, ClientError>
    where
        F: FnMut(&MatchProfile),
    {
        let mut stream = self
            .open(&Request::ListMatches { profile: template })
            .await?;
        loop {
            let response =
                tokio::time::timeout(timeout_match(), protocol::read_response(&mut stream))
                    .await
                    .map_err(|_| ProtocolError::Timeout)??;
            match response {
                Response::Match { profile } => on_match(&profile),
                Response::StreamEnd { emitted } => return Ok(emitted),
                other => return Err(unexpected(other)),
            }
        }
    }

    pub async fn delete_match(&self, id: &str) -> Result<(), ClientError> {
        let response = self
            .send(Request::DeleteMatch {
                profile: MatchProfile::new(id, ""),
            })
            .await?;
        expect_ok(response)
    }

    pub async fn create_assignments(&self, assignments: Assignments) -> Result<(), ClientError> {
        expect_ok(self.send(Request::CreateAssignments { assignments }).await?)
    }

    pub async fn delete_assignments(&self, roster: Roster) -> Result<(), ClientError> {
        expect_ok(self.send(Request::DeleteAssignments { roster }).await?)
    }

    /// Take the oldest pending request, if any
    pub async fn claim(&self) -> Result<Option<(String, MatchProfile)>, ClientError> {
        match self.send(Request::ClaimRequest).await? {
            Response::Claimed { key, profile } => Ok(Some((key, profile))),
            Response::QueueEmpty => Ok(None),
            other => Err(unexpected(other)),
        }
    }

    pub async fn complete(&self, key: &str, profile: MatchProfile) -> Result<(), ClientError> {
        let response = self
            .send(Request::CompleteRequest {
                key: key.to_string(),
                profile,
            })
            .await?;
        expect_ok(response)
    }
}

fn expect_ok(response: Response) -> Result<(), ClientError> {
    match response {
        Response::Result {
            result: OpResult { success: true, .. },
        } => Ok(()),
        Response::Result { result } => Err(ClientError::Rejected(result.error)),
        other => Err(unexpected(other)),
    }
}

/// Map the daemon's failure responses onto errors
fn unexpected(response: Response) -> ClientError {
    match response {
        Response::MatchFailed { message, profile } => ClientError::MatchFailed { message, profile },
        Response::Error { message } => ClientError::Rejected(message),
        _ => ClientError::UnexpectedResponse,
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
