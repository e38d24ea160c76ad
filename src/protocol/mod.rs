//! Protocol Module
//!
//! Defines the wire format spoken with the hash table service.
//!
//! ## Frame Format
//!
//! ```text
//! ┌─────────────────────────────┬─────────────────────────────┐
//! │       Header (19 bytes)     │     Body (Len bytes)        │
//! └─────────────────────────────┴─────────────────────────────┘
//! ```
//!
//! All integers are 32-bit big-endian. Body segments are length-prefixed
//! and always appear in the order namespace, object id, key, value.
//!
//! ### Status Codes
//! - 0: OK
//! - anything else: an OS error number reported by the peer (ENOENT = not found)

mod command;
pub mod codec;
pub mod header;
pub mod key;
pub mod request;

pub use command::Command;
pub use codec::{decode_i32_be, encode_i32_be};
pub use header::{ProtocolHeader, HEADER_SIZE, MAX_BODY_LEN};
pub use key::{KeyDescriptor, MAX_FULL_KEY_LEN};
pub use request::{
    encode_delete, encode_heart_beat, encode_quit, encode_set, DeleteRequest, SetRequest,
    SetWrites, INLINE_SEND_LIMIT,
};
