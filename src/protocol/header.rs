//! Protocol header
//!
//! Fixed-size record prefixed to every request and response.
//!
//! ```text
//! ┌──────────┬──────────┬───────────┬──────────┬───────┬───────────┬────────┐
//! │ Len (4)  │ Hash (4) │ Stamp (4) │ Exp (4)  │Cmd (1)│ Alive (1) │ St (1) │
//! └──────────┴──────────┴───────────┴──────────┴───────┴───────────┴────────┘
//! ```

use crate::error::{DhtError, Result};
use super::codec::{encode_i32_be, read_i32_at, INT_SIZE};
use super::Command;

/// Header size in bytes
pub const HEADER_SIZE: usize = 4 * INT_SIZE + 3;

/// Largest body length accepted from a peer (16 MB)
pub const MAX_BODY_LEN: u32 = 16 * 1024 * 1024;

const BODY_LEN_OFFSET: usize = 0;
const HASH_CODE_OFFSET: usize = 4;
const TIMESTAMP_OFFSET: usize = 8;
const EXPIRES_OFFSET: usize = 12;
const CMD_OFFSET: usize = 16;
const KEEP_ALIVE_OFFSET: usize = 17;
const STATUS_OFFSET: usize = 18;

/// Decoded protocol header
///
/// `body_len` is unsigned: a negative wire length never survives decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProtocolHeader {
    /// Number of body bytes following the header
    pub body_len: u32,

    /// Caller-computed routing hash
    pub key_hash_code: i32,

    /// Request time in seconds
    pub timestamp: i32,

    /// Expiration in seconds, 0 = never
    pub expires: i32,

    /// Raw command byte
    pub cmd: u8,

    /// Client intends to reuse the connection
    pub keep_alive: bool,

    /// 0 on success, otherwise an OS-style error number
    pub status: u8,
}

impl ProtocolHeader {
    /// Create a zeroed header for `command`
    pub fn new(command: Command) -> Self {
        Self {
            cmd: command as u8,
            ..Self::default()
        }
    }

    /// The command byte as a known command, if it is one
    pub fn command(&self) -> Option<Command> {
        Command::from_u8(self.cmd)
    }

    /// Serialize into the fixed wire layout
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[BODY_LEN_OFFSET..BODY_LEN_OFFSET + INT_SIZE]
            .copy_from_slice(&encode_i32_be(self.body_len as i32));
        buf[HASH_CODE_OFFSET..HASH_CODE_OFFSET + INT_SIZE]
            .copy_from_slice(&encode_i32_be(self.key_hash_code));
        buf[TIMESTAMP_OFFSET..TIMESTAMP_OFFSET + INT_SIZE]
            .copy_from_slice(&encode_i32_be(self.timestamp));
        buf[EXPIRES_OFFSET..EXPIRES_OFFSET + INT_SIZE]
            .copy_from_slice(&encode_i32_be(self.expires));
        buf[CMD_OFFSET] = self.cmd;
        buf[KEEP_ALIVE_OFFSET] = u8::from(self.keep_alive);
        buf[STATUS_OFFSET] = self.status;
        buf
    }

    /// Deserialize from the first `HEADER_SIZE` bytes of `bytes`
    ///
    /// Fails on a short buffer, a negative body length, or a body length
    /// above [`MAX_BODY_LEN`].
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Self::decode_from(bytes, "")
    }

    pub(crate) fn decode_from(bytes: &[u8], peer: &str) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(DhtError::protocol(
                peer,
                format!(
                    "incomplete header: expected {} bytes, got {}",
                    HEADER_SIZE,
                    bytes.len()
                ),
            ));
        }

        let body_len = read_i32_at(bytes, BODY_LEN_OFFSET);
        if body_len < 0 {
            return Err(DhtError::protocol(
                peer,
                format!("negative body length {}", body_len),
            ));
        }
        let body_len = body_len as u32;
        if body_len > MAX_BODY_LEN {
            return Err(DhtError::protocol(
                peer,
                format!("body length {} exceeds max {}", body_len, MAX_BODY_LEN),
            ));
        }

        Ok(Self {
            body_len,
            key_hash_code: read_i32_at(bytes, HASH_CODE_OFFSET),
            timestamp: read_i32_at(bytes, TIMESTAMP_OFFSET),
            expires: read_i32_at(bytes, EXPIRES_OFFSET),
            cmd: bytes[CMD_OFFSET],
            keep_alive: bytes[KEEP_ALIVE_OFFSET] != 0,
            status: bytes[STATUS_OFFSET],
        })
    }
}

/// Status byte of an encoded header, read without validating anything else
///
/// Responses are checked for a nonzero status before their body length.
pub fn peek_status(bytes: &[u8; HEADER_SIZE]) -> u8 {
    bytes[STATUS_OFFSET]
}
