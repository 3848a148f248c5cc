// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Framing for the bridge socket.
//!
//! Every frame is a big-endian `u32` byte count followed by that many bytes
//! of JSON. One request frame and one response frame per connection.

use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::UnixStream;

use super::{Request, Response};

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Frame too large: {size} bytes (max {max})")]
    FrameTooLarge { size: usize, max: usize },

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

/// Largest accepted frame body (1 MiB)
pub const MAX_FRAME_SIZE: usize = 1 << 20;

/// Per-frame read/write deadline
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

fn check_size(size: usize) -> Result<(), ProtocolError> {
    if size > MAX_FRAME_SIZE {
        return Err(ProtocolError::FrameTooLarge {
            size,
            max: MAX_FRAME_SIZE,
        });
    }
    Ok(())
}

async fn bounded<T>(
    timeout: Duration,
    fut: impl Future<Output = Result<T, ProtocolError>>,
) -> Result<T, ProtocolError> {
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| ProtocolError::Timeout(timeout))?
}

/// Serialize `msg` to a frame body (no length prefix)
pub fn encode<T: Serialize>(msg: &T) -> Result<Vec<u8>, ProtocolError> {
    let body = serde_json::to_vec(msg)?;
    check_size(body.len())?;
    Ok(body)
}

pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ProtocolError> {
    Ok(serde_json::from_slice(body)?)
}

/// Read one frame body. A stream that ends before the prefix is `ConnectionClosed`.
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Vec<u8>, ProtocolError> {
    let mut prefix = [0u8; 4];
    if let Err(e) = reader.read_exact(&mut prefix).await {
        return Err(match e.kind() {
            std::io::ErrorKind::UnexpectedEof => ProtocolError::ConnectionClosed,
            _ => ProtocolError::Io(e),
        });
    }
    let size = u32::from_be_bytes(prefix) as usize;
    check_size(size)?;

    let mut body = vec![0u8; size];
    reader.read_exact(&mut body).await?;
    Ok(body)
}

/// Write one frame: prefix, body, flush
pub async fn write_frame<W: AsyncWrite + Unpin>(
    writer: &mut W,
    body: &[u8],
) -> Result<(), ProtocolError> {
    check_size(body.len())?;
    writer.write_all(&(body.len() as u32).to_be_bytes()).await?;
    writer.write_all(body).await?;
    writer.flush().await?;
    Ok(())
}

/// Daemon side: read the connection's request
pub async fn read_request<R: AsyncRead + Unpin>(
    reader: &mut R,
    timeout: Duration,
) -> Result<Request, ProtocolError> {
    let body = bounded(timeout, read_frame(reader)).await?;
    decode(&body)
}

/// Daemon side: answer the connection's request
pub async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &Response,
    timeout: Duration,
) -> Result<(), ProtocolError> {
    let body = encode(response)?;
    bounded(timeout, write_frame(writer, &body)).await
}

/// Bridge side: send one request over a fresh connection and wait for the answer.
pub async fn call(
    stream: UnixStream,
    request: &Request,
    timeout: Duration,
) -> Result<Response, ProtocolError> {
    let (mut reader, mut writer) = stream.into_split();
    let body = encode(request)?;
    bounded(timeout, write_frame(&mut writer, &body)).await?;
    let reply = bounded(timeout, read_frame(&mut reader)).await?;
    decode(&reply)
}
