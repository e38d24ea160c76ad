//! Client Module
//!
//! SET, DELETE, HEART-BEAT and QUIT over a `ServerConnection`, plus the
//! response reception they share.
//!
//! ## Connection State
//! ```text
//! Disconnected ──connect / connect_via_proxy──▶ Connected ──disconnect──▶ Disconnected
//!                                                  │  ▲
//!                                                  └──┘ successful exchange
//! ```
//! Any I/O error should be followed by `disconnect`; nothing here reconnects.

mod operations;
pub mod response;

pub use operations::{delete, heart_beat, quit, set};
pub use response::{read_response, read_response_body, read_response_header, BodyBuffer, ResponseBody};
