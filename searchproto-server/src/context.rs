//! State shared by the adapter with every decoder and completion handler.

use crate::metrics::AdapterMetrics;
use searchproto_engine::{Clock, ConvertError, RelativeTime, SteadyClock};
use searchproto_protocol::{
    decode_from, encode_message, CompressionSettings, MessageKind, ReturnHandle, RpcErrorCode,
    Values, WireMessage,
};
use std::fmt;
use std::sync::Arc;

/// Diagnostic returned when a reply cannot be encoded.
pub const REPLY_ENCODE_FAILED: &str = "failed to encode reply";

/// Compression, metrics and clock used while serving calls.
#[derive(Clone)]
pub struct AdapterContext {
    compression: CompressionSettings,
    metrics: Option<Arc<AdapterMetrics>>,
    clock: Arc<dyn Clock>,
}

impl AdapterContext {
    pub fn new(compression: CompressionSettings) -> Self {
        Self {
            compression,
            metrics: None,
            clock: Arc::new(SteadyClock),
        }
    }

    pub fn compression(&self) -> &CompressionSettings {
        &self.compression
    }

    pub fn metrics(&self) -> Option<&Arc<AdapterMetrics>> {
        self.metrics.as_ref()
    }

    pub(crate) fn set_compression(&mut self, compression: CompressionSettings) {
        self.compression = compression;
    }

    pub(crate) fn set_metrics(&mut self, metrics: Arc<AdapterMetrics>) {
        self.metrics = Some(metrics);
    }

    pub(crate) fn set_clock(&mut self, clock: Arc<dyn Clock>) {
        self.clock = clock;
    }

    /// Starts a relative time anchored now.
    pub fn relative_time(&self) -> RelativeTime {
        RelativeTime::new(Arc::clone(&self.clock))
    }

    pub(crate) fn record_request(&self, kind: MessageKind) {
        if let Some(metrics) = &self.metrics {
            metrics.record_request(kind);
        }
    }

    pub(crate) fn record_inline_reply(&self, kind: MessageKind) {
        if let Some(metrics) = &self.metrics {
            metrics.record_inline_reply(kind);
        }
    }

    /// Decodes a wire request from call parameters.
    ///
    /// Failures are logged and counted; the caller only sees `None`.
    pub fn decode_request<M: WireMessage>(&self, params: &Values) -> Option<M> {
        match decode_from::<M>(params) {
            Ok(msg) => Some(msg),
            Err(e) => {
                tracing::warn!("Failed to decode {} request: {}", M::KIND, e);
                self.record_decode_failure(M::KIND);
                None
            }
        }
    }

    /// Logs and counts a request that decoded but could not be converted.
    pub(crate) fn conversion_failed(&self, kind: MessageKind, error: &ConvertError) {
        let reason = error.error_code();
        tracing::warn!("Rejected {} request ({}): {}", kind, reason, error);
        self.record_decode_failure(kind);
        if let Some(metrics) = &self.metrics {
            metrics.record_rejected(kind, reason);
        }
    }

    fn record_decode_failure(&self, kind: MessageKind) {
        if let Some(metrics) = &self.metrics {
            metrics.record_decode_failure(kind);
        }
    }

    /// Encodes a reply with the current compression settings and finishes
    /// the call with it.
    pub fn return_reply<M: WireMessage>(&self, reply: &M, handle: ReturnHandle) {
        let config = self.compression.snapshot();
        let envelope = match encode_message(reply, &config) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::error!("Failed to encode {} reply: {}", M::KIND, e);
                handle.fail(RpcErrorCode::MethodFailed, REPLY_ENCODE_FAILED);
                return;
            }
        };

        tracing::trace!(
            "Returning {} reply: {} -> {} bytes ({})",
            M::KIND,
            envelope.uncompressed_size,
            envelope.payload.len(),
            envelope.algorithm
        );
        if let Some(metrics) = &self.metrics {
            metrics.record_reply(M::KIND, envelope.algorithm, envelope.payload.len());
        }

        let mut values = Values::new();
        envelope.write_to(&mut values);
        handle.return_values(values);
    }
}

impl Default for AdapterContext {
    fn default() -> Self {
        Self::new(CompressionSettings::default())
    }
}

impl fmt::Debug for AdapterContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterContext")
            .field("compression", &self.compression.snapshot())
            .field("metrics", &self.metrics.is_some())
            .field("clock", &self.clock)
            .finish()
    }
}
