//! Compressed message envelope.
//!
//! Every request and reply crosses the RPC boundary as three values:
//!
//! ```text
//! +-----------+-------------------+----------------------------+
//! | algorithm | uncompressed_size | payload                    |
//! | u8 (b)    | i32 (i)           | bytes (x)                  |
//! +-----------+-------------------+----------------------------+
//! ```
//!
//! `uncompressed_size` is the exact length of the serialized message after
//! decompression; a payload that expands to any other length is rejected.

use crate::compression::{self, CompressionConfig, CompressionType};
use crate::error::ProtocolError;
use crate::rpc::{Value, Values};
use bytes::Bytes;

/// Type string of an envelope value list.
pub const ENVELOPE_TYPES: &str = "bix";

/// A serialized, possibly compressed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub algorithm: CompressionType,
    pub uncompressed_size: u32,
    pub payload: Bytes,
}

impl Envelope {
    /// Wraps an uncompressed message.
    pub fn raw(message: Bytes) -> Self {
        Self {
            algorithm: CompressionType::Raw,
            uncompressed_size: message.len() as u32,
            payload: message,
        }
    }

    /// Compresses a serialized message according to `config`.
    pub fn seal(config: &CompressionConfig, message: Vec<u8>) -> Self {
        let uncompressed_size = message.len() as u32;
        let (algorithm, payload) = compression::compress(config, message);
        Self {
            algorithm,
            uncompressed_size,
            payload,
        }
    }

    /// Returns the serialized message, decompressing if needed.
    pub fn open(&self) -> Result<Bytes, ProtocolError> {
        compression::decompress(self.algorithm, self.uncompressed_size, &self.payload)
    }

    /// Appends the envelope to a value list.
    pub fn write_to(&self, values: &mut Values) {
        values.add_int8(self.algorithm.as_u8());
        values.add_int32(self.uncompressed_size as i32);
        values.add_data(self.payload.clone());
    }

    /// Reads an envelope from a value list of type `"bix"`.
    pub fn read_from(values: &Values) -> Result<Self, ProtocolError> {
        if !values.matches(ENVELOPE_TYPES) {
            return Err(ProtocolError::ShapeMismatch {
                expected: ENVELOPE_TYPES,
                actual: values.type_string(),
            });
        }

        let (algorithm, size, payload) = match (values.get(0), values.get(1), values.get(2)) {
            (Some(Value::Int8(a)), Some(Value::Int32(s)), Some(Value::Data(p))) => (*a, *s, p),
            _ => {
                return Err(ProtocolError::ShapeMismatch {
                    expected: ENVELOPE_TYPES,
                    actual: values.type_string(),
                })
            }
        };

        let algorithm = CompressionType::from_u8(algorithm)?;
        let uncompressed_size = u32::try_from(size).map_err(|_| ProtocolError::InvalidSize(size))?;

        Ok(Self {
            algorithm,
            uncompressed_size,
            payload: payload.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(algorithm: u8, size: i32, payload: &'static [u8]) -> Values {
        let mut values = Values::new();
        values.add_int8(algorithm);
        values.add_int32(size);
        values.add_data(Bytes::from_static(payload));
        values
    }

    #[test]
    fn test_write_then_read() {
        let envelope = Envelope::raw(Bytes::from_static(b"hello"));
        let mut out = Values::new();
        envelope.write_to(&mut out);
        assert_eq!(out.type_string(), "bix");

        let read = Envelope::read_from(&out).unwrap();
        assert_eq!(read, envelope);
        assert_eq!(read.open().unwrap().as_ref(), b"hello");
    }

    #[test]
    fn test_seal_compresses_large_message() {
        let message: Vec<u8> = b"abcdefgh".iter().copied().cycle().take(4096).collect();
        let envelope = Envelope::seal(&CompressionConfig::default(), message.clone());
        assert_eq!(envelope.algorithm, CompressionType::Lz4);
        assert_eq!(envelope.uncompressed_size, 4096);
        assert!(envelope.payload.len() < 4096);
        assert_eq!(envelope.open().unwrap().as_ref(), message.as_slice());
    }

    #[test]
    fn test_wrong_shape() {
        let mut short = Values::new();
        short.add_int8(0);
        short.add_int32(0);
        assert!(matches!(
            Envelope::read_from(&short),
            Err(ProtocolError::ShapeMismatch { expected: "bix", actual }) if actual == "bi"
        ));

        let mut wide = Values::new();
        wide.add_int8(0);
        wide.add_int64(0);
        wide.add_data(Bytes::new());
        assert!(matches!(
            Envelope::read_from(&wide),
            Err(ProtocolError::ShapeMismatch { actual, .. }) if actual == "blx"
        ));
    }

    #[test]
    fn test_unknown_algorithm() {
        assert!(matches!(
            Envelope::read_from(&values(3, 3, b"abc")),
            Err(ProtocolError::UnknownAlgorithm(3))
        ));
    }

    #[test]
    fn test_negative_size() {
        assert!(matches!(
            Envelope::read_from(&values(0, -1, b"abc")),
            Err(ProtocolError::InvalidSize(-1))
        ));
    }

    #[test]
    fn test_open_checks_declared_size() {
        let envelope = Envelope::read_from(&values(0, 4, b"abc")).unwrap();
        assert!(matches!(
            envelope.open(),
            Err(ProtocolError::SizeMismatch {
                declared: 4,
                actual: 3
            })
        ));
    }
}
