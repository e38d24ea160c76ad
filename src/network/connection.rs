//! Server Connection
//!
//! Owns the TCP stream to one server.

use std::fmt;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use crate::error::{DhtError, IoStage, Result};
use super::transport;

/// One TCP endpoint and, while connected, its non-blocking stream
///
/// `stream` is `None` whenever the connection is closed, so closing twice is
/// a no-op and I/O after close fails with `NotConnected`.
#[derive(Debug)]
pub struct ServerConnection {
    host: String,
    port: u16,

    /// "host:port", cached for log lines
    peer: String,

    stream: Option<TcpStream>,
}

impl ServerConnection {
    /// Describe a server; no socket is opened
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        let host = host.into();
        let peer = format!("{}:{}", host, port);
        Self {
            host,
            port,
            peer,
            stream: None,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// "host:port" of the server
    pub fn peer(&self) -> &str {
        &self.peer
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Dial the server, closing any existing socket first
    ///
    /// Each resolved address is tried in turn within one overall deadline.
    /// The stream is attached only once it is connected and non-blocking.
    pub fn connect(&mut self, timeout: Duration) -> Result<()> {
        self.disconnect();

        match self.dial(timeout) {
            Ok(stream) => {
                tracing::debug!(peer = %self.peer, "connected");
                self.stream = Some(stream);
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    peer = %self.peer,
                    errno = e.errno(),
                    error = %e,
                    "connect to server fail"
                );
                Err(e)
            }
        }
    }

    fn dial(&self, timeout: Duration) -> Result<TcpStream> {
        let addrs: Vec<SocketAddr> = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|source| DhtError::AddrResolve {
                peer: self.peer.clone(),
                source,
            })?
            .collect();

        let start = Instant::now();
        let mut last_err = None;

        for addr in addrs {
            let remaining = match timeout.checked_sub(start.elapsed()) {
                Some(d) if !d.is_zero() => d,
                _ => break,
            };

            match TcpStream::connect_timeout(&addr, remaining) {
                Ok(stream) => {
                    return self.configure(stream);
                }
                Err(e) => {
                    tracing::trace!(peer = %self.peer, %addr, error = %e, "address failed");
                    last_err = Some(e);
                }
            }
        }

        match last_err {
            Some(e) if e.kind() == std::io::ErrorKind::TimedOut
                || e.kind() == std::io::ErrorKind::WouldBlock =>
            {
                Err(self.connect_timed_out(start))
            }
            Some(e) => Err(DhtError::from_io(&self.peer, IoStage::Connect, e)),
            None if start.elapsed() >= timeout => Err(self.connect_timed_out(start)),
            None => Err(DhtError::AddrResolve {
                peer: self.peer.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "no addresses resolved",
                ),
            }),
        }
    }

    fn configure(&self, stream: TcpStream) -> Result<TcpStream> {
        stream
            .set_nodelay(true)
            .and_then(|_| stream.set_nonblocking(true))
            .map_err(|e| DhtError::from_io(&self.peer, IoStage::Connect, e))?;
        Ok(stream)
    }

    fn connect_timed_out(&self, start: Instant) -> DhtError {
        DhtError::Timeout {
            peer: self.peer.clone(),
            stage: IoStage::Connect,
            done: 0,
            expected: 0,
            elapsed: start.elapsed(),
        }
    }

    /// Adopt a stream that is already connected to this server
    ///
    /// Used by the proxy handshake; any previous socket is closed.
    pub(crate) fn attach(&mut self, stream: TcpStream) {
        self.disconnect();
        self.stream = Some(stream);
    }

    /// Detach the live stream without closing it
    pub(crate) fn take_stream(&mut self) -> Option<TcpStream> {
        self.stream.take()
    }

    /// Close the socket if open; otherwise a no-op
    pub fn disconnect(&mut self) {
        if self.stream.take().is_some() {
            tracing::debug!(peer = %self.peer, "disconnected");
        }
    }

    // =========================================================================
    // I/O
    // =========================================================================

    /// Write all of `buf` within `timeout`
    pub fn send_all(&mut self, buf: &[u8], timeout: Duration) -> Result<()> {
        let stream = self.stream.as_mut().ok_or_else(|| DhtError::NotConnected {
            peer: self.peer.clone(),
        })?;
        transport::send_all(stream, buf, &self.peer, timeout)
    }

    /// Fill all of `buf` within `timeout`
    pub fn recv_into(&mut self, buf: &mut [u8], timeout: Duration) -> Result<()> {
        let stream = self.stream.as_mut().ok_or_else(|| DhtError::NotConnected {
            peer: self.peer.clone(),
        })?;
        transport::recv_into(stream, buf, &self.peer, timeout)
    }

    /// Read exactly `n` bytes within `timeout`
    pub fn recv_exact(&mut self, n: usize, timeout: Duration) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        self.recv_into(&mut buf, timeout)?;
        Ok(buf)
    }
}

impl fmt::Display for ServerConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.peer)
    }
}
