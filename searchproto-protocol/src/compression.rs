//! Pluggable payload compression.
//!
//! The algorithm byte is part of the wire contract:
//!
//! ```text
//! +------+------------------------------+
//! | byte | algorithm                    |
//! +------+------------------------------+
//! |  0   | raw (payload is the message) |
//! |  6   | LZ4 block                    |
//! |  7   | Zstd frame                   |
//! +------+------------------------------+
//! ```
//!
//! Compression is opportunistic: a message is sent raw when it is below the
//! configured minimum size or when compressing it does not save enough.

use crate::error::ProtocolError;
use crate::MAX_MESSAGE_SIZE;
use bytes::Bytes;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;
use std::str::FromStr;
use std::sync::Arc;

/// Compression algorithm carried in the first envelope value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionType {
    /// Payload is the serialized message itself.
    #[serde(alias = "none")]
    Raw,
    /// LZ4 block format; fast, modest ratio.
    Lz4,
    /// Zstd frame format; slower, higher ratio.
    Zstd,
}

impl CompressionType {
    /// Returns the wire byte for this algorithm.
    pub fn as_u8(self) -> u8 {
        match self {
            CompressionType::Raw => 0,
            CompressionType::Lz4 => 6,
            CompressionType::Zstd => 7,
        }
    }

    /// Parses a wire byte.
    pub fn from_u8(value: u8) -> Result<Self, ProtocolError> {
        match value {
            0 => Ok(CompressionType::Raw),
            6 => Ok(CompressionType::Lz4),
            7 => Ok(CompressionType::Zstd),
            other => Err(ProtocolError::UnknownAlgorithm(other)),
        }
    }

    pub fn is_compressed(self) -> bool {
        self != CompressionType::Raw
    }
}

impl fmt::Display for CompressionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressionType::Raw => write!(f, "raw"),
            CompressionType::Lz4 => write!(f, "lz4"),
            CompressionType::Zstd => write!(f, "zstd"),
        }
    }
}

impl FromStr for CompressionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "raw" | "none" => Ok(CompressionType::Raw),
            "lz4" => Ok(CompressionType::Lz4),
            "zstd" => Ok(CompressionType::Zstd),
            other => Err(format!("unknown compression type '{}'", other)),
        }
    }
}

/// Compression parameters used when encoding an outgoing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    /// Algorithm to try.
    #[serde(rename = "type")]
    pub compression_type: CompressionType,
    /// Compression level (zstd only; 0 selects the library default).
    pub level: u8,
    /// Messages shorter than this many bytes are sent raw.
    pub min_size: u32,
    /// Compressed output is kept only if smaller than this percentage
    /// of the original size.
    pub threshold: u8,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            compression_type: CompressionType::Lz4,
            level: 9,
            min_size: 0,
            threshold: 80,
        }
    }
}

impl CompressionConfig {
    /// Configuration that never compresses.
    pub fn raw() -> Self {
        Self {
            compression_type: CompressionType::Raw,
            ..Default::default()
        }
    }

    pub fn new(compression_type: CompressionType) -> Self {
        Self {
            compression_type,
            ..Default::default()
        }
    }

    pub fn with_level(mut self, level: u8) -> Self {
        self.level = level;
        self
    }

    pub fn with_min_size(mut self, min_size: u32) -> Self {
        self.min_size = min_size;
        self
    }

    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    fn should_compress(&self, len: usize) -> bool {
        self.compression_type.is_compressed() && len > 0 && len >= self.min_size as usize
    }

    fn is_effective(&self, original: usize, compressed: usize) -> bool {
        (compressed as u64) * 100 < (original as u64) * u64::from(self.threshold)
    }
}

/// Compresses `data` according to `config`.
///
/// Returns the algorithm actually used together with the payload. Falls back
/// to raw when compression is disabled, skipped, ineffective or fails.
pub fn compress(config: &CompressionConfig, data: Vec<u8>) -> (CompressionType, Bytes) {
    if !config.should_compress(data.len()) {
        return (CompressionType::Raw, Bytes::from(data));
    }

    let compressed = match config.compression_type {
        CompressionType::Raw => return (CompressionType::Raw, Bytes::from(data)),
        CompressionType::Lz4 => Ok(lz4_flex::block::compress(&data)),
        CompressionType::Zstd => zstd::bulk::compress(&data, i32::from(config.level.min(22))),
    };

    match compressed {
        Ok(output) if config.is_effective(data.len(), output.len()) => {
            (config.compression_type, Bytes::from(output))
        }
        Ok(output) => {
            tracing::trace!(
                "{} compression not effective ({} -> {} bytes), sending raw",
                config.compression_type,
                data.len(),
                output.len()
            );
            (CompressionType::Raw, Bytes::from(data))
        }
        Err(e) => {
            tracing::warn!(
                "{} compression failed, sending raw: {}",
                config.compression_type,
                e
            );
            (CompressionType::Raw, Bytes::from(data))
        }
    }
}

/// Decompresses `payload` and verifies it yields exactly `declared` bytes.
pub fn decompress(
    algorithm: CompressionType,
    declared: u32,
    payload: &Bytes,
) -> Result<Bytes, ProtocolError> {
    if declared > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: declared as usize,
            max: MAX_MESSAGE_SIZE,
        });
    }
    let expected = declared as usize;

    let output = match algorithm {
        CompressionType::Raw => payload.clone(),
        CompressionType::Lz4 => {
            if declared_exceeds_lz4_bound(expected, payload.len()) {
                return Err(ProtocolError::Decompress {
                    algorithm,
                    reason: format!(
                        "declared size {} exceeds what {} payload bytes can expand to",
                        declared,
                        payload.len()
                    ),
                });
            }
            let mut buf = vec![0u8; expected];
            match lz4_flex::block::decompress_into(payload, &mut buf) {
                Ok(written) => {
                    buf.truncate(written);
                    Bytes::from(buf)
                }
                Err(lz4_flex::block::DecompressError::OutputTooSmall { expected: needed, .. }) => {
                    // Output would run past the declared size.
                    return Err(ProtocolError::SizeMismatch {
                        declared,
                        actual: needed.max(expected + 1),
                    });
                }
                Err(e) => {
                    return Err(ProtocolError::Decompress {
                        algorithm,
                        reason: e.to_string(),
                    })
                }
            }
        }
        CompressionType::Zstd => {
            let decompress_failed = |e: std::io::Error| ProtocolError::Decompress {
                algorithm,
                reason: e.to_string(),
            };
            // Reading one byte past the declared size surfaces an oversized
            // frame as a mismatch without trusting the declared size.
            let input: &[u8] = payload;
            let decoder = zstd::stream::read::Decoder::new(input).map_err(decompress_failed)?;
            let mut output = Vec::new();
            decoder
                .take(expected as u64 + 1)
                .read_to_end(&mut output)
                .map_err(decompress_failed)?;
            Bytes::from(output)
        }
    };

    if output.len() != expected {
        return Err(ProtocolError::SizeMismatch {
            declared,
            actual: output.len(),
        });
    }
    Ok(output)
}

/// LZ4 expands at most 255 output bytes per input byte, plus a short tail.
const LZ4_MAX_EXPANSION: usize = 255;
const LZ4_TAIL_SLACK: usize = 24;

fn declared_exceeds_lz4_bound(declared: usize, payload_len: usize) -> bool {
    let bound = payload_len
        .saturating_mul(LZ4_MAX_EXPANSION)
        .saturating_add(LZ4_TAIL_SLACK);
    declared > bound
}

/// Shared, operator-updatable compression configuration.
///
/// Every encode takes one [`snapshot`](Self::snapshot); updates only affect
/// calls that snapshot afterwards.
#[derive(Debug, Clone, Default)]
pub struct CompressionSettings {
    inner: Arc<RwLock<CompressionConfig>>,
}

impl CompressionSettings {
    pub fn new(config: CompressionConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Returns the current configuration.
    pub fn snapshot(&self) -> CompressionConfig {
        *self.inner.read()
    }

    /// Replaces the whole configuration.
    pub fn update(&self, config: CompressionConfig) {
        *self.inner.write() = config;
        tracing::info!(
            "Compression config updated: type={} level={} min_size={} threshold={}%",
            config.compression_type,
            config.level,
            config.min_size,
            config.threshold
        );
    }

    pub fn set_type(&self, compression_type: CompressionType) {
        self.inner.write().compression_type = compression_type;
    }

    pub fn set_level(&self, level: u8) {
        self.inner.write().level = level;
    }

    pub fn set_min_size(&self, min_size: u32) {
        self.inner.write().min_size = min_size;
    }
}
