//! Key descriptor
//!
//! The namespace + object id + key triple that identifies a stored value.

use bytes::BytesMut;

use crate::error::{DhtError, Result};
use super::codec::{put_segment, INT_SIZE};

/// Longest namespace accepted by the service
pub const MAX_NAMESPACE_LEN: usize = 64;

/// Longest object id accepted by the service
pub const MAX_OBJECT_ID_LEN: usize = 128;

/// Longest key accepted by the service
pub const MAX_KEY_LEN: usize = 64;

/// Upper bound on namespace + object id + key
pub const MAX_FULL_KEY_LEN: usize = MAX_NAMESPACE_LEN + MAX_OBJECT_ID_LEN + MAX_KEY_LEN;

/// Bytes of length prefixes in front of the three key segments
pub const KEY_PREFIX_LEN: usize = 3 * INT_SIZE;

/// Composite identity of a stored value
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyDescriptor {
    /// Namespace, may be empty
    pub namespace: Vec<u8>,

    /// Object id, may be empty
    pub object_id: Vec<u8>,

    /// Key name, required
    pub key: Vec<u8>,
}

impl KeyDescriptor {
    /// Key in the default namespace with no object id
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// Fully qualified key
    pub fn with_object(
        namespace: impl Into<Vec<u8>>,
        object_id: impl Into<Vec<u8>>,
        key: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            object_id: object_id.into(),
            key: key.into(),
        }
    }

    /// Combined length of the three segments, without prefixes
    pub fn full_len(&self) -> usize {
        self.namespace.len() + self.object_id.len() + self.key.len()
    }

    /// Bytes this descriptor occupies in a request body
    pub fn encoded_len(&self) -> usize {
        KEY_PREFIX_LEN + self.full_len()
    }

    /// Check segment limits before anything touches the wire
    pub fn validate(&self) -> Result<()> {
        if self.key.is_empty() {
            return Err(DhtError::InvalidArgument("key is empty".to_string()));
        }
        if self.key.len() > MAX_KEY_LEN {
            return Err(DhtError::InvalidArgument(format!(
                "key length {} exceeds max {}",
                self.key.len(),
                MAX_KEY_LEN
            )));
        }
        if self.namespace.len() > MAX_NAMESPACE_LEN {
            return Err(DhtError::InvalidArgument(format!(
                "namespace length {} exceeds max {}",
                self.namespace.len(),
                MAX_NAMESPACE_LEN
            )));
        }
        if self.object_id.len() > MAX_OBJECT_ID_LEN {
            return Err(DhtError::InvalidArgument(format!(
                "object id length {} exceeds max {}",
                self.object_id.len(),
                MAX_OBJECT_ID_LEN
            )));
        }
        if self.full_len() > MAX_FULL_KEY_LEN {
            return Err(DhtError::InvalidArgument(format!(
                "full key length {} exceeds max {}",
                self.full_len(),
                MAX_FULL_KEY_LEN
            )));
        }
        Ok(())
    }

    /// Append namespace, object id and key, each length-prefixed, in that order
    pub fn put_segments(&self, buf: &mut BytesMut) {
        put_segment(buf, &self.namespace);
        put_segment(buf, &self.object_id);
        put_segment(buf, &self.key);
    }
}
