//! Command definitions
//!
//! One-byte command codes carried in the protocol header.

/// Command codes understood by the hash table service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    Quit = 10,
    Set = 11,
    Delete = 14,

    /// Replication variant of SET, same body framing
    SyncSet = 23,

    /// Replication variant of DELETE, same body framing
    SyncDelete = 24,

    HeartBeat = 30,

    /// Command byte servers put in responses
    Response = 40,
}

impl Command {
    /// Map a raw command byte back to a known command
    pub fn from_u8(code: u8) -> Option<Self> {
        match code {
            10 => Some(Command::Quit),
            11 => Some(Command::Set),
            14 => Some(Command::Delete),
            23 => Some(Command::SyncSet),
            24 => Some(Command::SyncDelete),
            30 => Some(Command::HeartBeat),
            40 => Some(Command::Response),
            _ => None,
        }
    }

    /// Commands whose request body is namespace, object id, key, value
    pub fn is_set(self) -> bool {
        matches!(self, Command::Set | Command::SyncSet)
    }

    /// Commands whose request body is namespace, object id, key
    pub fn is_delete(self) -> bool {
        matches!(self, Command::Delete | Command::SyncDelete)
    }
}
