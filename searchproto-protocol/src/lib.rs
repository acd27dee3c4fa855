//! # searchproto-protocol
//!
//! Wire protocol for the search backend RPC boundary.
//!
//! This crate provides:
//! - Compressed message envelopes `(u8 algorithm, i32 uncompressed_size, bytes payload)`
//! - Pluggable compression (raw, LZ4, Zstd) driven by a shared configuration
//! - Protobuf message types for search, docsum and monitor requests/replies
//! - One generic codec shared by all message kinds
//! - A minimal in-process RPC layer (typed values, call objects, method registry)

pub mod codec;
pub mod compression;
pub mod envelope;
pub mod error;
pub mod message;
pub mod rpc;

pub use codec::{decode_from, decode_message, encode_into, encode_message, MessageKind, WireMessage};
pub use compression::{CompressionConfig, CompressionSettings, CompressionType};
pub use envelope::{Envelope, ENVELOPE_TYPES};
pub use error::ProtocolError;
pub use rpc::{
    CompletedCall, InboundCall, MethodHandler, MethodSpec, PendingReply, ReturnHandle, RpcError,
    RpcErrorCode, RpcRequest, Supervisor, Value, Values,
};

/// Method name for search requests.
pub const SEARCH_METHOD: &str = "vespa.searchprotocol.search";

/// Method name for document summary requests.
pub const DOCSUM_METHOD: &str = "vespa.searchprotocol.getDocsums";

/// Method name for health pings.
pub const PING_METHOD: &str = "vespa.searchprotocol.ping";

/// Largest uncompressed message accepted in either direction (64 MiB).
pub const MAX_MESSAGE_SIZE: u32 = 64 * 1024 * 1024;
