//! # searchproto-client
//!
//! Client side of the search protocol boundary.
//!
//! This crate provides:
//! - Request encoding and reply decoding mirroring the server adapter
//! - An async client that speaks domain types over any call transport

pub mod client;
pub mod codec;
pub mod error;

pub use client::{Client, Transport};
pub use codec::{
    decode_docsum_reply, decode_monitor_reply, decode_search_reply, encode_docsum_request,
    encode_monitor_request, encode_search_request,
};
pub use error::ClientError;
