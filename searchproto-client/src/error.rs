//! Client error types.

use searchproto_protocol::RpcErrorCode;
use thiserror::Error;

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("protocol error: {0}")]
    Protocol(#[from] searchproto_protocol::ProtocolError),

    #[error("invalid reply: {0}")]
    Convert(#[from] searchproto_engine::ConvertError),

    #[error("request timeout")]
    Timeout,
}

impl ClientError {
    /// Returns the RPC error code if the call itself failed.
    pub fn call_error(&self) -> Option<RpcErrorCode> {
        match self {
            ClientError::Protocol(searchproto_protocol::ProtocolError::CallFailed {
                code, ..
            }) => RpcErrorCode::from_code(*code),
            _ => None,
        }
    }

    /// Returns whether this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.call_error(),
            Some(RpcErrorCode::Timeout | RpcErrorCode::Overload | RpcErrorCode::Connection)
        ) || matches!(self, ClientError::Timeout)
    }
}
