//! Client-side envelope codec.
//!
//! Encoding fills a request's method name and parameters; decoding reads a
//! finished call's return values. Both sides use the same `bix` envelope as
//! the server adapter.

use searchproto_protocol::message as proto;
use searchproto_protocol::{
    decode_from, encode_into, CompletedCall, CompressionConfig, ProtocolError,
    RpcRequest, WireMessage,
};

fn encode_request<M: WireMessage>(
    msg: &M,
    config: &CompressionConfig,
    request: &mut RpcRequest,
) -> Result<(), ProtocolError> {
    request.set_method_name(M::KIND.method_name());
    request.params_mut().clear();
    encode_into(msg, config, request.params_mut())
}

fn decode_reply<M: WireMessage>(call: &CompletedCall) -> Result<M, ProtocolError> {
    if let Some(err) = call.error() {
        return Err(ProtocolError::CallFailed {
            code: err.code,
            message: err.message.clone(),
        });
    }
    decode_from(call.return_values())
}

/// Writes a search request into `request`.
pub fn encode_search_request(
    msg: &proto::SearchRequest,
    config: &CompressionConfig,
    request: &mut RpcRequest,
) -> Result<(), ProtocolError> {
    encode_request(msg, config, request)
}

/// Writes a docsum request into `request`.
pub fn encode_docsum_request(
    msg: &proto::DocsumRequest,
    config: &CompressionConfig,
    request: &mut RpcRequest,
) -> Result<(), ProtocolError> {
    encode_request(msg, config, request)
}

/// Writes a ping request into `request`.
pub fn encode_monitor_request(
    msg: &proto::MonitorRequest,
    config: &CompressionConfig,
    request: &mut RpcRequest,
) -> Result<(), ProtocolError> {
    encode_request(msg, config, request)
}

pub fn decode_search_reply(call: &CompletedCall) -> Result<proto::SearchReply, ProtocolError> {
    decode_reply(call)
}

pub fn decode_docsum_reply(call: &CompletedCall) -> Result<proto::DocsumReply, ProtocolError> {
    decode_reply(call)
}

pub fn decode_monitor_reply(call: &CompletedCall) -> Result<proto::MonitorReply, ProtocolError> {
    decode_reply(call)
}
