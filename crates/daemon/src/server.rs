// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TCP server and connection handling.

use async_trait::async_trait;
use mb_adapters::PropertyConverter;
use mb_core::{IdGen, MatchProfile, Metrics, OpResult};
use mb_engine::{Backend, MatchSink, SinkClosed};
use mb_storage::StateStore;
use tokio::io::{AsyncReadExt, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, Instrument};

use crate::protocol::{self, Request, Response, DEFAULT_TIMEOUT};

/// Accept connections until `shutdown` fires, one task per connection
pub async fn serve<S, I, M, C>(
    listener: TcpListener,
    backend: Backend<S, I, M, C>,
    shutdown: CancellationToken,
) where
    S: StateStore,
    I: IdGen,
    M: Metrics,
    C: PropertyConverter,
{
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            result = listener.accept() => match result {
                Ok((stream, peer)) => {
                    let backend = backend.clone();
                    let cancel = shutdown.child_token();
                    let span = tracing::info_span!("connection", %peer);
                    tokio::spawn(
                        async move {
                            if let Err(e) = handle_connection(&backend, stream, cancel).await {
                                error!("Error handling connection: {}", e);
                            }
                        }
                        .instrument(span),
                    );
                }
                Err(e) => error!("Error accepting connection: {}", e),
            }
        }
    }
    info!("Server stopped accepting connections");
}

/// Handle a single client connection.
///
/// The connection carries one request. Once it is read, the client sending
/// anything else, closing its write half, or hanging up cancels the call.
pub async fn handle_connection<S, I, M, C>(
    backend: &Backend<S, I, M, C>,
    stream: TcpStream,
    cancel: CancellationToken,
) -> Result<(), ServerError>
where
    S: StateStore,
    I: IdGen,
    M: Metrics,
    C: PropertyConverter,
{
    let (mut reader, mut writer) = stream.into_split();

    let request = match protocol::read_request(&mut reader, DEFAULT_TIMEOUT).await {
        Ok(req) => req,
        Err(protocol::ProtocolError::Timeout) => {
            error!("Request read timeout");
            return Err(ServerError::Timeout);
        }
        Err(protocol::ProtocolError::ConnectionClosed) => {
            debug!("Client disconnected before sending request");
            return Ok(());
        }
        Err(e) => {
            error!("Failed to read request: {}", e);
            return Err(ServerError::Protocol(e));
        }
    };

    debug!("Received request: {:?}", request);

    // Clients keep their write half open until the response arrives. EOF
    // here cannot tell a half-close from a full close, so both cancel.
    let hangup = cancel.clone();
    let watcher = tokio::spawn(async move {
        let mut buf = [0u8; 1];
        // Any outcome ends the call: EOF, a read error, or bytes past the
        // single request
        match reader.read(&mut buf).await {
            Ok(0) => debug!("Client hung up"),
            Ok(_) => debug!("Unexpected data after request, cancelling"),
            Err(e) => debug!("Client read failed: {}", e),
        }
        hangup.cancel();
    });

    let result = handle_request(backend, request, &mut writer, &cancel).await;
    watcher.abort();
    result
}

async fn handle_request<S, I, M, C, W>(
    backend: &Backend<S, I, M, C>,
    request: Request,
    writer: &mut W,
    cancel: &CancellationToken,
) -> Result<(), ServerError>
where
    S: StateStore,
    I: IdGen,
    M: Metrics,
    C: PropertyConverter,
    W: AsyncWrite + Unpin + Send,
{
    let response = match request {
        Request::Ping => Response::Pong,

        Request::CreateMatch { profile } => match backend.create_match(profile, cancel).await {
            Ok(profile) => Response::Match { profile },
            Err(failure) => Response::MatchFailed {
                message: failure.to_string(),
                profile: failure.profile,
            },
        },

        Request::ListMatches { profile } => {
            let mut sink = ResponseSink { writer: &mut *writer };
            match backend.list_matches(&profile, &mut sink, cancel).await {
                Ok(summary) => Response::StreamEnd {
                    emitted: summary.emitted,
                },
                Err(failure) => Response::MatchFailed {
                    message: failure.to_string(),
                    profile: failure.profile,
                },
            }
        }

        Request::DeleteMatch { profile } => Response::Result {
            result: OpResult::from_outcome(&backend.delete_match(&profile).await),
        },

        Request::CreateAssignments { assignments } => Response::Result {
            result: OpResult::from_outcome(&backend.create_assignments(&assignments).await),
        },

        Request::DeleteAssignments { roster } => Response::Result {
            result: OpResult::from_outcome(&backend.delete_assignments(&roster).await),
        },

        Request::ClaimRequest => match backend.claim_request().await {
            Ok(Some(claimed)) => Response::Claimed {
                key: claimed.key,
                profile: claimed.profile,
            },
            Ok(None) => Response::QueueEmpty,
            Err(e) => Response::Error {
                message: e.to_string(),
            },
        },

        Request::CompleteRequest { key, profile } => Response::Result {
            result: OpResult::from_outcome(&backend.complete_request(&key, &profile).await),
        },
    };

    if cancel.is_cancelled() {
        debug!("Client gone, dropping response");
        return Ok(());
    }

    debug!("Sending response: {:?}", response);
    protocol::write_response(writer, &response, DEFAULT_TIMEOUT)
        .await
        .map_err(ServerError::Protocol)
}

/// Streams matches to the client as `Match` responses
struct ResponseSink<'a, W> {
    writer: &'a mut W,
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> MatchSink for ResponseSink<'_, W> {
    async fn send(&mut self, profile: MatchProfile) -> Result<(), SinkClosed> {
        protocol::write_response(&mut *self.writer, &Response::Match { profile }, DEFAULT_TIMEOUT)
            .await
            .map_err(|e| {
                debug!("Stream write failed: {}", e);
                SinkClosed
            })
    }
}

/// Server errors
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] protocol::ProtocolError),

    #[error("Request timeout")]
    Timeout,
}
