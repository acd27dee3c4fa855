//! Server error types.

use crate::config::ConfigError;
use thiserror::Error;

/// Errors from setting up the adapter.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("protocol error: {0}")]
    Protocol(#[from] searchproto_protocol::ProtocolError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use searchproto_protocol::ProtocolError;

    #[test]
    fn test_error_display() {
        let err: ServerError = ProtocolError::MethodExists("m".to_string()).into();
        assert!(err.to_string().starts_with("protocol error:"));
        assert!(err.to_string().contains("method already registered"));

        let err: ServerError = ConfigError::ValidationError("bad".to_string()).into();
        assert!(err.to_string().starts_with("configuration error:"));
    }
}
