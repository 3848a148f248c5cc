// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener task for handling socket I/O.
//!
//! The Listener runs in a spawned task, accepting connections and handling
//! each in its own task, so a slow ticket never blocks another.

use std::sync::Arc;
use std::time::Instant;

use nudge_adapters::Messenger;
use nudge_core::Clock;
use nudge_engine::Runtime;
use nudge_storage::TicketStore;
use thiserror::Error;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

use crate::protocol::{self, Request, Response, DEFAULT_TIMEOUT, PROTOCOL_VERSION};

/// Listener task for accepting socket connections.
pub struct Listener<M, S, C: Clock> {
    socket: UnixListener,
    ctx: Arc<ListenCtx<M, S, C>>,
}

/// State shared by every connection
pub(crate) struct ListenCtx<M, S, C: Clock> {
    pub runtime: Arc<Runtime<M, S, C>>,
    pub start_time: Instant,
    pub shutdown: Arc<Notify>,
}

/// Errors from connection handling.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] protocol::ProtocolError),
}

impl<M, S, C> Listener<M, S, C>
where
    M: Messenger,
    S: TicketStore,
    C: Clock,
{
    pub fn new(
        socket: UnixListener,
        runtime: Arc<Runtime<M, S, C>>,
        start_time: Instant,
        shutdown: Arc<Notify>,
    ) -> Self {
        Self {
            socket,
            ctx: Arc::new(ListenCtx {
                runtime,
                start_time,
                shutdown,
            }),
        }
    }

    /// Run the listener loop until shutdown, spawning tasks for each connection.
    pub async fn run(self) {
        loop {
            match self.socket.accept().await {
                Ok((stream, _)) => {
                    let ctx = Arc::clone(&self.ctx);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, &ctx).await {
                            match e {
                                ConnectionError::Protocol(
                                    protocol::ProtocolError::ConnectionClosed,
                                ) => debug!("Client disconnected"),
                                ConnectionError::Protocol(protocol::ProtocolError::Timeout(_)) => {
                                    warn!("Connection timeout")
                                }
                                _ => error!("Connection error: {}", e),
                            }
                        }
                    });
                }
                Err(e) => {
                    error!("Accept error: {}", e);
                }
            }
        }
    }
}

/// Handle a single client connection.
async fn handle_connection<M, S, C>(
    stream: UnixStream,
    ctx: &ListenCtx<M, S, C>,
) -> Result<(), ConnectionError>
where
    M: Messenger,
    S: TicketStore,
    C: Clock,
{
    let (mut reader, mut writer) = stream.into_split();

    let request = protocol::read_request(&mut reader, DEFAULT_TIMEOUT).await?;

    if request.is_poll() {
        debug!(request = ?request, "received request");
    } else {
        info!(request = ?request, "received request");
    }

    let response = handle_request(request, ctx).await;
    debug!("Sending response: {:?}", response);

    protocol::write_response(&mut writer, &response, DEFAULT_TIMEOUT).await?;
    Ok(())
}

/// Handle a single request and return a response.
pub(crate) async fn handle_request<M, S, C>(request: Request, ctx: &ListenCtx<M, S, C>) -> Response
where
    M: Messenger,
    S: TicketStore,
    C: Clock,
{
    let runtime = &ctx.runtime;
    match request {
        Request::Ping => Response::Pong,

        Request::Hello { version: _ } => Response::Hello {
            version: PROTOCOL_VERSION.to_string(),
        },

        Request::Event { event } => match runtime.handle_event(event).await {
            Ok(()) => Response::Ok,
            Err(e) => error_response(e),
        },

        Request::Command {
            ticket_id,
            invoker,
            command,
        } => match runtime.handle_command(&ticket_id, &invoker, command).await {
            Ok(reply) => Response::Command {
                message: reply.message(),
                reply,
            },
            Err(e) => error_response(e),
        },

        Request::TicketStatus { ticket_id } => match runtime.status(&ticket_id).await {
            Ok(status) => Response::TicketStatus { status },
            Err(e) => error_response(e),
        },

        Request::Status => {
            let timers = runtime.scheduler().lock().len();
            match runtime.ticket_count().await {
                Ok(tickets) => Response::Status {
                    uptime_secs: ctx.start_time.elapsed().as_secs(),
                    tickets,
                    timers,
                },
                Err(e) => error_response(e),
            }
        }

        Request::Shutdown => {
            ctx.shutdown.notify_one();
            Response::ShuttingDown
        }
    }
}

fn error_response(e: impl std::fmt::Display) -> Response {
    warn!(error = %e, "request failed");
    Response::Error {
        message: e.to_string(),
    }
}

#[cfg(test)]
#[path = "../listener_tests.rs"]
mod tests;
