//! Network Module
//!
//! TCP transport to hash table servers.
//!
//! ## Architecture
//! - One `ServerConnection` per server, owned by one caller at a time
//! - Non-blocking sockets driven by deadline-bounded retry loops
//! - Optional proxy handshake that replaces a direct dial

mod connection;
pub mod proxy;
pub mod transport;

pub use connection::ServerConnection;
pub use proxy::{connect_via_proxy, ProxyTarget};
