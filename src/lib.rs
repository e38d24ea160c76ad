//! # dhtproto
//!
//! Client side of the hash table service wire protocol:
//! - Byte-exact request framing for SET, DELETE, HEART-BEAT and QUIT
//! - Non-blocking sockets with deadline-bounded send and receive
//! - Fixed header and variable body decoding with buffer-size contracts
//! - Proxy handshake that hands back a socket to a chosen backend
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        client                                │
//! │          set / delete / heart_beat / quit / read_*           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌───────────────┐
//!   │  protocol   │          │    network    │
//!   │ header/key/ │          │ connection /  │
//!   │  request    │          │ transport /   │
//!   └──────┬──────┘          │ proxy         │
//!          │                 └───────┬───────┘
//!          ▼                         │
//!   ┌─────────────┐                  │
//!   │ byte codec  │◀─────────────────┘
//!   └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use dhtproto::{client, ClientConfig, KeyDescriptor, ServerConnection, SetRequest};
//!
//! # fn main() -> dhtproto::Result<()> {
//! let config = ClientConfig::default();
//! let mut conn = ServerConnection::new("127.0.0.1", 24000);
//! conn.connect(config.connect_timeout)?;
//!
//! let key = KeyDescriptor::new("user:42");
//! client::set(&mut conn, &SetRequest::new(&key, b"hello").keep_alive(true), &config)?;
//!
//! client::quit(&mut conn, &config)?;
//! conn.disconnect();
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{DhtError, Result};
pub use config::ClientConfig;
pub use network::{connect_via_proxy, ProxyTarget, ServerConnection};
pub use protocol::{Command, DeleteRequest, KeyDescriptor, ProtocolHeader, SetRequest};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of dhtproto
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
