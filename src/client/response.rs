//! Response reception
//!
//! Reads the fixed header and, when one is declared, the body that follows.

use std::time::Duration;

use crate::error::{DhtError, Result};
use crate::network::ServerConnection;
use crate::protocol::header::{peek_status, ProtocolHeader, HEADER_SIZE};

/// Where a response body should land
#[derive(Debug)]
pub enum BodyBuffer<'a> {
    /// Caller's buffer; its length is the capacity. Never freed or replaced here.
    CallerOwned(&'a mut [u8]),

    /// Allocate exactly the declared size; handed to the caller only on success
    CalleeOwned,
}

/// A received response body
#[derive(Debug, PartialEq, Eq)]
pub enum ResponseBody<'a> {
    /// The peer declared no body
    Empty,

    /// Filled prefix of a caller-owned buffer
    Borrowed(&'a [u8]),

    /// Freshly allocated body
    Owned(Vec<u8>),
}

impl ResponseBody<'_> {
    pub fn as_slice(&self) -> &[u8] {
        match self {
            ResponseBody::Empty => &[],
            ResponseBody::Borrowed(body) => body,
            ResponseBody::Owned(body) => body,
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take the body as an owned vector, copying only when borrowed
    pub fn into_vec(self) -> Vec<u8> {
        match self {
            ResponseBody::Empty => Vec::new(),
            ResponseBody::Borrowed(body) => body.to_vec(),
            ResponseBody::Owned(body) => body,
        }
    }
}

/// Receive a response header and return its declared body length
///
/// A nonzero status is returned as the peer-reported error before the body
/// length is looked at. A negative or oversized body length is a protocol
/// error. Peer-reported statuses are left for the caller to log.
pub fn read_response_header(conn: &mut ServerConnection, timeout: Duration) -> Result<usize> {
    let mut raw = [0u8; HEADER_SIZE];
    if let Err(e) = conn.recv_into(&mut raw, timeout) {
        tracing::error!(
            peer = %conn,
            errno = e.errno(),
            error = %e,
            "recv data fail"
        );
        return Err(e);
    }

    let status = peek_status(&raw);
    if status != 0 {
        return Err(DhtError::from_status(conn.peer(), i32::from(status)));
    }

    match ProtocolHeader::decode_from(&raw, conn.peer()) {
        Ok(header) => Ok(header.body_len as usize),
        Err(e) => {
            tracing::error!(
                peer = %conn,
                errno = e.errno(),
                error = %e,
                "recv package size is not correct"
            );
            Err(e)
        }
    }
}

/// Receive a body of `declared_len` bytes into `buffer`
///
/// Nothing is read for an empty body or when a caller-owned buffer is too
/// small. A callee-owned allocation is dropped if the read fails.
pub fn read_response_body<'a>(
    conn: &mut ServerConnection,
    declared_len: usize,
    buffer: BodyBuffer<'a>,
    timeout: Duration,
) -> Result<ResponseBody<'a>> {
    if declared_len == 0 {
        return Ok(ResponseBody::Empty);
    }

    match buffer {
        BodyBuffer::CallerOwned(buf) => {
            if declared_len > buf.len() {
                let e = DhtError::BufferTooSmall {
                    peer: conn.peer().to_string(),
                    declared: declared_len,
                    capacity: buf.len(),
                };
                tracing::error!(peer = %conn, errno = e.errno(), error = %e, "recv body exceeds buffer");
                return Err(e);
            }

            let filled = &mut buf[..declared_len];
            if let Err(e) = conn.recv_into(filled, timeout) {
                tracing::error!(peer = %conn, errno = e.errno(), error = %e, "recv data fail");
                return Err(e);
            }
            Ok(ResponseBody::Borrowed(filled))
        }
        BodyBuffer::CalleeOwned => {
            let mut body = Vec::new();
            if body.try_reserve_exact(declared_len).is_err() {
                let e = DhtError::Alloc {
                    bytes: declared_len,
                };
                tracing::error!(peer = %conn, errno = e.errno(), error = %e, "malloc fail");
                return Err(e);
            }
            body.resize(declared_len, 0);

            if let Err(e) = conn.recv_into(&mut body, timeout) {
                tracing::error!(peer = %conn, errno = e.errno(), error = %e, "recv data fail");
                return Err(e);
            }
            Ok(ResponseBody::Owned(body))
        }
    }
}

/// Receive a full response: header, then the body it declares
///
/// Unlike [`read_response_header`], a peer-reported status is logged here.
pub fn read_response<'a>(
    conn: &mut ServerConnection,
    buffer: BodyBuffer<'a>,
    timeout: Duration,
) -> Result<ResponseBody<'a>> {
    let declared_len = match read_response_header(conn, timeout) {
        Ok(len) => len,
        Err(e @ (DhtError::Status { .. } | DhtError::NotFound { .. })) => {
            tracing::error!(peer = %conn, errno = e.errno(), error = %e, "server status error");
            return Err(e);
        }
        Err(e) => return Err(e),
    };
    read_response_body(conn, declared_len, buffer, timeout)
}
