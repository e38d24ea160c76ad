//! Proxy Handshake
//!
//! Asks a proxy to dial a backend server and hand back the connected socket.
//!
//! ### Request
//! ```text
//! ┌────────────────┬──────────────┬────────────────────────┬───────────┐
//! │ Header (19)    │ AddrLen (4)  │ Addr (16, zero-padded) │ Port (4)  │
//! └────────────────┴──────────────┴────────────────────────┴───────────┘
//! ```
//!
//! ### Response
//! ```text
//! ┌────────────────┬──────────────┐
//! │ Header (19)    │ Result (4)   │
//! └────────────────┴──────────────┘
//! ```
//!
//! The response header must declare a body of exactly 4 bytes. A nonzero
//! result is the error the proxy hit while dialing the backend.

use std::net::TcpStream;

use crate::config::ClientConfig;
use crate::error::{DhtError, Result};
use crate::protocol::codec::{encode_i32_be, read_i32_at, INT_SIZE};
use crate::protocol::header::{ProtocolHeader, HEADER_SIZE};
use super::ServerConnection;

/// Fixed width of the address field in the server-descriptor record
pub const IP_ADDRESS_SIZE: usize = 16;

/// Server-descriptor record: address length, address field, port
pub const SERVER_INFO_LEN: usize = INT_SIZE + IP_ADDRESS_SIZE + INT_SIZE;

pub const PROXY_REQUEST_LEN: usize = HEADER_SIZE + SERVER_INFO_LEN;
pub const PROXY_RESPONSE_LEN: usize = HEADER_SIZE + INT_SIZE;

/// The proxy to broker connections through
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyTarget {
    pub host: String,
    pub port: u16,
}

impl ProxyTarget {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

/// Frame the request asking the proxy to dial `host:port`
///
/// The address must leave room for a terminating zero in its 16-byte field.
pub fn encode_proxy_request(host: &str, port: u16) -> Result<[u8; PROXY_REQUEST_LEN]> {
    let addr = host.as_bytes();
    if addr.len() >= IP_ADDRESS_SIZE {
        return Err(DhtError::InvalidArgument(format!(
            "backend address {:?} does not fit in {} bytes",
            host,
            IP_ADDRESS_SIZE - 1
        )));
    }

    let header = ProtocolHeader {
        body_len: SERVER_INFO_LEN as u32,
        ..ProtocolHeader::default()
    };

    let mut buf = [0u8; PROXY_REQUEST_LEN];
    buf[..HEADER_SIZE].copy_from_slice(&header.encode());

    let mut at = HEADER_SIZE;
    buf[at..at + INT_SIZE].copy_from_slice(&encode_i32_be(addr.len() as i32));
    at += INT_SIZE;
    buf[at..at + addr.len()].copy_from_slice(addr);
    at += IP_ADDRESS_SIZE;
    buf[at..at + INT_SIZE].copy_from_slice(&encode_i32_be(i32::from(port)));

    Ok(buf)
}

/// Validate a proxy response and extract its result code
pub fn decode_proxy_response(bytes: &[u8; PROXY_RESPONSE_LEN], peer: &str) -> Result<i32> {
    let header = ProtocolHeader::decode_from(bytes, peer)?;
    if header.body_len as usize != INT_SIZE {
        return Err(DhtError::protocol(
            peer,
            format!("invalid proxy body length {} != {}", header.body_len, INT_SIZE),
        ));
    }
    Ok(read_i32_at(bytes, HEADER_SIZE))
}

/// Obtain a connection to `backend` brokered by `proxy`
///
/// On success the proxy's socket becomes `backend`'s live socket. On any
/// failure the proxy socket is closed and `backend` is left untouched.
pub fn connect_via_proxy(
    proxy: &ProxyTarget,
    backend: &mut ServerConnection,
    config: &ClientConfig,
) -> Result<()> {
    let request = match encode_proxy_request(backend.host(), backend.port()) {
        Ok(request) => request,
        Err(e) => {
            tracing::error!(backend = %backend, errno = e.errno(), error = %e, "invalid proxy request");
            return Err(e);
        }
    };

    let mut conn = ServerConnection::new(proxy.host.clone(), proxy.port);
    conn.connect(config.connect_timeout)?;

    let stream = handshake(&mut conn, &request, backend, config)?;
    backend.attach(stream);

    tracing::debug!(proxy = %conn, backend = %backend, "connected through proxy");
    Ok(())
}

fn handshake(
    conn: &mut ServerConnection,
    request: &[u8],
    backend: &ServerConnection,
    config: &ClientConfig,
) -> Result<TcpStream> {
    let result = exchange(conn, request, config).and_then(|code| {
        if code == 0 {
            Ok(())
        } else {
            Err(DhtError::ProxyConnect {
                backend: backend.peer().to_string(),
                code,
            })
        }
    });

    if let Err(e) = result {
        tracing::error!(
            proxy = %conn,
            backend = %backend,
            errno = e.errno(),
            error = %e,
            "proxy handshake fail"
        );
        conn.disconnect();
        return Err(e);
    }

    conn.take_stream().ok_or_else(|| DhtError::NotConnected {
        peer: conn.peer().to_string(),
    })
}

fn exchange(conn: &mut ServerConnection, request: &[u8], config: &ClientConfig) -> Result<i32> {
    conn.send_all(request, config.network_timeout)?;

    let mut response = [0u8; PROXY_RESPONSE_LEN];
    conn.recv_into(&mut response, config.network_timeout)?;

    decode_proxy_response(&response, conn.peer())
}
