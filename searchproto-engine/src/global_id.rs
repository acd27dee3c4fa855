//! Global document ids.

use crate::error::ConvertError;
use std::fmt;

/// Length of a global document id in bytes.
pub const GID_LENGTH: usize = 12;

/// Cluster-wide document identifier.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GlobalId([u8; GID_LENGTH]);

impl GlobalId {
    pub const fn new(bytes: [u8; GID_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Builds an id from a byte slice of exactly [`GID_LENGTH`] bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ConvertError> {
        let bytes: [u8; GID_LENGTH] = bytes
            .try_into()
            .map_err(|_| ConvertError::InvalidGlobalId { len: bytes.len() })?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; GID_LENGTH] {
        &self.0
    }
}

impl From<[u8; GID_LENGTH]> for GlobalId {
    fn from(bytes: [u8; GID_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for GlobalId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for GlobalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for GlobalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GlobalId({})", self)
    }
}
