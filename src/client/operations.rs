//! Request/response operations
//!
//! Each operation is one exchange on a connected `ServerConnection`:
//! frame, send, then (except QUIT) read a header that must carry no body.
//! A failed operation leaves reconnecting to the caller.

use crate::config::ClientConfig;
use crate::error::{DhtError, Result};
use crate::network::ServerConnection;
use crate::protocol::Command;
use crate::protocol::request::{
    encode_delete, encode_heart_beat, encode_quit, encode_set, DeleteRequest, SetRequest, SetWrites,
};
use super::response::read_response_header;

/// Store a value
///
/// Small frames go out in one write; large values follow the header and
/// key prefixes in a second write.
pub fn set(conn: &mut ServerConnection, req: &SetRequest<'_>, config: &ClientConfig) -> Result<()> {
    let writes = match encode_set(req) {
        Ok(writes) => writes,
        Err(e) => {
            tracing::error!(peer = %conn, errno = e.errno(), error = %e, "invalid set request");
            return Err(e);
        }
    };

    let timeout = config.network_timeout;
    let sent = match &writes {
        SetWrites::Single(frame) => conn.send_all(frame, timeout),
        SetWrites::Split { prefix, value } => conn
            .send_all(prefix, timeout)
            .and_then(|_| conn.send_all(value, timeout)),
    };
    if let Err(e) = sent {
        tracing::error!(peer = %conn, errno = e.errno(), error = %e, "send data to server fail");
        return Err(e);
    }

    expect_empty_response(conn, config, Command::Set)
}

/// Remove a value
///
/// A missing key comes back as `DhtError::NotFound` and is logged as a
/// warning rather than an error.
pub fn delete(
    conn: &mut ServerConnection,
    req: &DeleteRequest<'_>,
    config: &ClientConfig,
) -> Result<()> {
    let frame = match encode_delete(req) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::error!(peer = %conn, errno = e.errno(), error = %e, "invalid delete request");
            return Err(e);
        }
    };

    if let Err(e) = conn.send_all(&frame, config.network_timeout) {
        tracing::error!(peer = %conn, errno = e.errno(), error = %e, "send data to server fail");
        return Err(e);
    }

    expect_empty_response(conn, config, Command::Delete)
}

/// Check the server is alive; keep-alive is always set
pub fn heart_beat(conn: &mut ServerConnection, config: &ClientConfig) -> Result<()> {
    if let Err(e) = conn.send_all(&encode_heart_beat(), config.network_timeout) {
        tracing::error!(peer = %conn, errno = e.errno(), error = %e, "send data to server fail");
        return Err(e);
    }

    expect_empty_response(conn, config, Command::HeartBeat)
}

/// Tell the server we are leaving; no response is read
pub fn quit(conn: &mut ServerConnection, config: &ClientConfig) -> Result<()> {
    if let Err(e) = conn.send_all(&encode_quit(), config.network_timeout) {
        tracing::error!(peer = %conn, errno = e.errno(), error = %e, "send data to server fail");
        return Err(e);
    }
    Ok(())
}

/// Only DELETE treats a missing key as an expected outcome.
fn expect_empty_response(
    conn: &mut ServerConnection,
    config: &ClientConfig,
    command: Command,
) -> Result<()> {
    let body_len = match read_response_header(conn, config.network_timeout) {
        Ok(len) => len,
        Err(e @ DhtError::NotFound { .. }) if command.is_delete() => {
            tracing::warn!(peer = %conn, errno = e.errno(), error = %e, "recv data from server fail");
            return Err(e);
        }
        Err(e @ (DhtError::Status { .. } | DhtError::NotFound { .. })) => {
            tracing::error!(peer = %conn, errno = e.errno(), error = %e, "recv data from server fail");
            return Err(e);
        }
        // already logged while reading the header
        Err(e) => return Err(e),
    };

    if body_len != 0 {
        let e = DhtError::Protocol {
            peer: conn.peer().to_string(),
            reason: format!("response bytes {} != 0", body_len),
        };
        tracing::error!(peer = %conn, errno = e.errno(), error = %e, "unexpected response body");
        return Err(e);
    }

    Ok(())
}
