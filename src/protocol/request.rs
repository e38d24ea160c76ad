//! Request framing
//!
//! Builds the exact bytes each operation puts on the wire.
//!
//! ### Body by Command
//! - SET / SYNC_SET: ns_len(4) ns | obj_len(4) obj | key_len(4) key | value_len(4) value
//! - DEL / SYNC_DEL: ns_len(4) ns | obj_len(4) obj | key_len(4) key
//! - HEART_BEAT, QUIT: empty

use std::time::{SystemTime, UNIX_EPOCH};

use bytes::{Bytes, BytesMut};

use crate::error::{DhtError, Result};
use super::codec::{put_len, INT_SIZE};
use super::header::{ProtocolHeader, HEADER_SIZE, MAX_BODY_LEN};
use super::key::{KeyDescriptor, KEY_PREFIX_LEN, MAX_FULL_KEY_LEN};
use super::Command;

/// Bytes of length prefixes in a SET body (three key segments + value)
pub const SET_PREFIX_LEN: usize = KEY_PREFIX_LEN + INT_SIZE;

/// Largest SET frame sent as a single write; anything bigger goes out as
/// header+key prefix followed by the value
pub const INLINE_SEND_LIMIT: usize = HEADER_SIZE + MAX_FULL_KEY_LEN + SET_PREFIX_LEN + 1024;

// =============================================================================
// SET
// =============================================================================

/// A SET (or SYNC_SET) request
#[derive(Debug, Clone)]
pub struct SetRequest<'a> {
    pub command: Command,
    pub keep_alive: bool,
    pub timestamp: i32,
    pub expires: i32,
    pub key_hash_code: i32,
    pub key: &'a KeyDescriptor,
    pub value: &'a [u8],
}

impl<'a> SetRequest<'a> {
    /// Plain SET, timestamped now, never expiring
    pub fn new(key: &'a KeyDescriptor, value: &'a [u8]) -> Self {
        Self {
            command: Command::Set,
            keep_alive: false,
            timestamp: unix_now(),
            expires: 0,
            key_hash_code: 0,
            key,
            value,
        }
    }

    pub fn command(mut self, command: Command) -> Self {
        self.command = command;
        self
    }

    pub fn keep_alive(mut self, keep_alive: bool) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    pub fn timestamp(mut self, timestamp: i32) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn expires(mut self, expires: i32) -> Self {
        self.expires = expires;
        self
    }

    pub fn key_hash_code(mut self, code: i32) -> Self {
        self.key_hash_code = code;
        self
    }

    /// Declared body length: four prefixes plus segment and value bytes
    pub fn body_len(&self) -> usize {
        SET_PREFIX_LEN + self.key.full_len() + self.value.len()
    }
}

/// Write plan for a SET frame
///
/// Both shapes put identical bytes on the wire.
#[derive(Debug, Clone)]
pub enum SetWrites<'a> {
    /// Whole frame in one buffer
    Single(Bytes),

    /// Header and prefixes first, then the caller's value untouched
    Split { prefix: Bytes, value: &'a [u8] },
}

impl SetWrites<'_> {
    /// Concatenated wire bytes
    pub fn to_vec(&self) -> Vec<u8> {
        match self {
            SetWrites::Single(frame) => frame.to_vec(),
            SetWrites::Split { prefix, value } => {
                let mut out = Vec::with_capacity(prefix.len() + value.len());
                out.extend_from_slice(prefix);
                out.extend_from_slice(value);
                out
            }
        }
    }
}

/// Frame a SET request
pub fn encode_set<'a>(req: &SetRequest<'a>) -> Result<SetWrites<'a>> {
    if !req.command.is_set() {
        return Err(DhtError::InvalidArgument(format!(
            "{:?} is not a set command",
            req.command
        )));
    }
    req.key.validate()?;

    let body_len = req.body_len();
    check_body_len(body_len)?;

    let header = ProtocolHeader {
        body_len: body_len as u32,
        key_hash_code: req.key_hash_code,
        timestamp: req.timestamp,
        expires: req.expires,
        cmd: req.command as u8,
        keep_alive: req.keep_alive,
        status: 0,
    };

    let prefix_len = HEADER_SIZE + SET_PREFIX_LEN + req.key.full_len();
    let inline = prefix_len + req.value.len() <= INLINE_SEND_LIMIT;
    let capacity = if inline {
        prefix_len + req.value.len()
    } else {
        prefix_len
    };

    let mut buf = BytesMut::with_capacity(capacity);
    buf.extend_from_slice(&header.encode());
    req.key.put_segments(&mut buf);
    put_len(&mut buf, req.value.len());

    if inline {
        buf.extend_from_slice(req.value);
        Ok(SetWrites::Single(buf.freeze()))
    } else {
        Ok(SetWrites::Split {
            prefix: buf.freeze(),
            value: req.value,
        })
    }
}

// =============================================================================
// DELETE
// =============================================================================

/// A DELETE (or SYNC_DEL) request
#[derive(Debug, Clone)]
pub struct DeleteRequest<'a> {
    pub command: Command,
    pub keep_alive: bool,
    pub timestamp: i32,
    pub key_hash_code: i32,
    pub key: &'a KeyDescriptor,
}

impl<'a> DeleteRequest<'a> {
    /// Plain DELETE, timestamped now
    pub fn new(key: &'a KeyDescriptor) -> Self {
        Self {
            command: Command::Delete,
            keep_alive: false,
            timestamp: unix_now(),
            key_hash_code: 0,
            key,
        }
    }

    pub fn command(mut self, command: Command) -> Self {
        self.command = command;
        self
    }

    pub fn keep_alive(mut self, keep_alive: bool) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    pub fn timestamp(mut self, timestamp: i32) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn key_hash_code(mut self, code: i32) -> Self {
        self.key_hash_code = code;
        self
    }

    /// Declared body length: three prefixes plus segment bytes
    pub fn body_len(&self) -> usize {
        self.key.encoded_len()
    }
}

/// Frame a DELETE request
pub fn encode_delete(req: &DeleteRequest<'_>) -> Result<Bytes> {
    if !req.command.is_delete() {
        return Err(DhtError::InvalidArgument(format!(
            "{:?} is not a delete command",
            req.command
        )));
    }
    req.key.validate()?;

    let body_len = req.body_len();
    let header = ProtocolHeader {
        body_len: body_len as u32,
        key_hash_code: req.key_hash_code,
        timestamp: req.timestamp,
        cmd: req.command as u8,
        keep_alive: req.keep_alive,
        ..ProtocolHeader::default()
    };

    let mut buf = BytesMut::with_capacity(HEADER_SIZE + body_len);
    buf.extend_from_slice(&header.encode());
    req.key.put_segments(&mut buf);
    Ok(buf.freeze())
}

// =============================================================================
// HEART-BEAT / QUIT
// =============================================================================

/// Frame a HEART-BEAT request; keep-alive is always on
pub fn encode_heart_beat() -> [u8; HEADER_SIZE] {
    ProtocolHeader {
        keep_alive: true,
        ..ProtocolHeader::new(Command::HeartBeat)
    }
    .encode()
}

/// Frame a QUIT request
pub fn encode_quit() -> [u8; HEADER_SIZE] {
    ProtocolHeader::new(Command::Quit).encode()
}

// =============================================================================
// Helpers
// =============================================================================

fn check_body_len(body_len: usize) -> Result<()> {
    if body_len > MAX_BODY_LEN as usize {
        return Err(DhtError::InvalidArgument(format!(
            "body length {} exceeds max {}",
            body_len, MAX_BODY_LEN
        )));
    }
    Ok(())
}

/// Current unix time in seconds, as carried in the header
pub fn unix_now() -> i32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i32)
        .unwrap_or(0)
}
