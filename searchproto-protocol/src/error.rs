//! Protocol error types.

use crate::compression::CompressionType;
use thiserror::Error;

/// Errors that can occur while framing, compressing or parsing messages.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("unknown compression algorithm: {0}")]
    UnknownAlgorithm(u8),

    #[error("size mismatch: envelope declares {declared} bytes, payload decompressed to {actual}")]
    SizeMismatch { declared: u32, actual: usize },

    #[error("{algorithm} decompression failed: {reason}")]
    Decompress {
        algorithm: CompressionType,
        reason: String,
    },

    #[error("protobuf decode error: {0}")]
    Parse(#[from] prost::DecodeError),

    #[error("unexpected value types: expected '{expected}', got '{actual}'")]
    ShapeMismatch {
        expected: &'static str,
        actual: String,
    },

    #[error("invalid uncompressed size: {0}")]
    InvalidSize(i32),

    #[error("message too large: {size} bytes (max {max})")]
    MessageTooLarge { size: usize, max: u32 },

    #[error("rpc call failed: {code} - {message}")]
    CallFailed { code: u32, message: String },

    #[error("method already registered: {0}")]
    MethodExists(String),
}

impl ProtocolError {
    /// Returns whether this error means the received bytes could not be
    /// turned into a message (as opposed to a transport or setup problem).
    pub fn is_decode_failure(&self) -> bool {
        matches!(
            self,
            ProtocolError::UnknownAlgorithm(_)
                | ProtocolError::SizeMismatch { .. }
                | ProtocolError::Decompress { .. }
                | ProtocolError::Parse(_)
                | ProtocolError::ShapeMismatch { .. }
                | ProtocolError::InvalidSize(_)
                | ProtocolError::MessageTooLarge { .. }
        )
    }
}
