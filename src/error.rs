//! Error types for dhtproto
//!
//! Provides a unified error type for all client operations.
//!
//! Status codes exchanged with the peer share the numeric space of local OS
//! error numbers. [`DhtError::from_status`] is the only place a wire code is
//! turned into a typed error, and [`DhtError::errno`] is the only place a
//! typed error is turned back into a number.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Result type alias using DhtError
pub type Result<T> = std::result::Result<T, DhtError>;

/// OS error numbers used on the wire, in the platform's own numbering
pub mod errno {
    pub const ENOENT: i32 = libc::ENOENT;
    pub const EIO: i32 = libc::EIO;
    pub const ENOMEM: i32 = libc::ENOMEM;
    pub const EINVAL: i32 = libc::EINVAL;
    pub const ENOSPC: i32 = libc::ENOSPC;
    pub const ENOTCONN: i32 = libc::ENOTCONN;
    pub const ECONNRESET: i32 = libc::ECONNRESET;
    pub const ETIMEDOUT: i32 = libc::ETIMEDOUT;
    pub const ECONNREFUSED: i32 = libc::ECONNREFUSED;
    pub const EHOSTUNREACH: i32 = libc::EHOSTUNREACH;
}

/// Direction of a timed transfer, used in error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoStage {
    Connect,
    Send,
    Recv,
}

impl std::fmt::Display for IoStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IoStage::Connect => f.write_str("connect"),
            IoStage::Send => f.write_str("send"),
            IoStage::Recv => f.write_str("recv"),
        }
    }
}

/// Unified error type for dhtproto operations
#[derive(Debug, Error)]
pub enum DhtError {
    // -------------------------------------------------------------------------
    // Connection Errors
    // -------------------------------------------------------------------------
    #[error("cannot resolve {peer}: {source}")]
    AddrResolve {
        peer: String,
        #[source]
        source: io::Error,
    },

    #[error("connection to {peer} refused")]
    ConnectionRefused { peer: String },

    #[error("connect to {peer} failed: {source}")]
    Connect {
        peer: String,
        #[source]
        source: io::Error,
    },

    // -------------------------------------------------------------------------
    // Transport I/O Errors
    // -------------------------------------------------------------------------
    #[error("{stage} {peer} timed out after {elapsed:?} ({done} of {expected} bytes)")]
    Timeout {
        peer: String,
        stage: IoStage,
        done: usize,
        expected: usize,
        elapsed: Duration,
    },

    #[error("peer {peer} closed the connection after {done} of {expected} bytes")]
    PeerClosed {
        peer: String,
        done: usize,
        expected: usize,
    },

    #[error("connection to {peer} reset during {stage}")]
    ConnectionReset { peer: String, stage: IoStage },

    #[error("{stage} {peer} failed: {source}")]
    Io {
        peer: String,
        stage: IoStage,
        #[source]
        source: io::Error,
    },

    #[error("not connected to {peer}")]
    NotConnected { peer: String },

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("protocol error from {peer}: {reason}")]
    Protocol { peer: String, reason: String },

    // -------------------------------------------------------------------------
    // Peer-Reported Errors
    // -------------------------------------------------------------------------
    #[error("{peer} reported status {code}: {}", describe(*code))]
    Status { peer: String, code: i32 },

    #[error("key not found on {peer}")]
    NotFound { peer: String },

    #[error("proxy could not connect to {backend}, code {code}: {}", describe(*code))]
    ProxyConnect { backend: String, code: i32 },

    // -------------------------------------------------------------------------
    // Local Resource Errors
    // -------------------------------------------------------------------------
    #[error("cannot allocate {bytes} bytes for response body")]
    Alloc { bytes: usize },

    #[error("response body from {peer} is {declared} bytes, buffer holds {capacity}")]
    BufferTooSmall {
        peer: String,
        declared: usize,
        capacity: usize,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl DhtError {
    /// Translate a nonzero status code sent by a peer
    pub fn from_status(peer: &str, code: i32) -> Self {
        match code {
            errno::ENOENT => DhtError::NotFound {
                peer: peer.to_string(),
            },
            _ => DhtError::Status {
                peer: peer.to_string(),
                code,
            },
        }
    }

    /// Classify an io::Error raised while talking to `peer`
    pub fn from_io(peer: &str, stage: IoStage, err: io::Error) -> Self {
        let peer = peer.to_string();
        match err.kind() {
            io::ErrorKind::ConnectionRefused => DhtError::ConnectionRefused { peer },
            io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe => DhtError::ConnectionReset { peer, stage },
            io::ErrorKind::NotConnected => DhtError::NotConnected { peer },
            _ if stage == IoStage::Connect => DhtError::Connect { peer, source: err },
            _ => DhtError::Io {
                peer,
                stage,
                source: err,
            },
        }
    }

    pub(crate) fn protocol(peer: &str, reason: impl Into<String>) -> Self {
        DhtError::Protocol {
            peer: peer.to_string(),
            reason: reason.into(),
        }
    }

    /// OS-style error number for this error
    ///
    /// Peer-reported codes are passed through untouched so they can be
    /// re-dispatched or compared against local error numbers.
    pub fn errno(&self) -> i32 {
        match self {
            DhtError::AddrResolve { .. } => errno::EHOSTUNREACH,
            DhtError::ConnectionRefused { .. } => errno::ECONNREFUSED,
            DhtError::Connect { source, .. } => source.raw_os_error().unwrap_or(errno::EIO),
            DhtError::Timeout { .. } => errno::ETIMEDOUT,
            DhtError::PeerClosed { .. } => errno::ECONNRESET,
            DhtError::ConnectionReset { .. } => errno::ECONNRESET,
            DhtError::Io { source, .. } => source.raw_os_error().unwrap_or(errno::EIO),
            DhtError::NotConnected { .. } => errno::ENOTCONN,
            DhtError::Protocol { .. } => errno::EINVAL,
            DhtError::Status { code, .. } => *code,
            DhtError::NotFound { .. } => errno::ENOENT,
            DhtError::ProxyConnect { code, .. } => *code,
            DhtError::Alloc { .. } => errno::ENOMEM,
            DhtError::BufferTooSmall { .. } => errno::ENOSPC,
            DhtError::InvalidArgument(_) => errno::EINVAL,
        }
    }

    /// True for the not-found outcome, which callers usually treat as normal
    pub fn is_not_found(&self) -> bool {
        matches!(self, DhtError::NotFound { .. })
    }

    /// True when the connection can no longer be trusted and should be dropped
    pub fn is_fatal_to_connection(&self) -> bool {
        !matches!(
            self,
            DhtError::Status { .. } | DhtError::NotFound { .. } | DhtError::InvalidArgument(_)
        )
    }
}

fn describe(code: i32) -> String {
    io::Error::from_raw_os_error(code).to_string()
}
