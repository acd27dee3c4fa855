//! Prometheus metrics for the protocol adapter.

use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use searchproto_protocol::{CompressionType, MessageKind};

/// Encoded reply size buckets (in bytes).
const REPLY_SIZE_BUCKETS: &[f64] = &[
    64.0, 256.0, 1024.0, 4096.0, 16384.0, 65536.0, 262144.0, 1048576.0,
];

/// Prometheus metrics for adapter traffic.
#[derive(Clone)]
pub struct AdapterMetrics {
    registry: Registry,
    /// Inbound calls by method.
    pub requests_total: CounterVec,
    /// Requests that could not be decoded, by method.
    pub decode_failures_total: CounterVec,
    /// Requests that decoded but failed conversion, by method and reason.
    pub rejected_requests_total: CounterVec,
    /// Replies completed inline by the adapter, by method.
    pub inline_replies_total: CounterVec,
    /// Encoded replies by method and compression algorithm.
    pub replies_total: CounterVec,
    /// Encoded reply payload size by method.
    pub reply_bytes: HistogramVec,
}

impl AdapterMetrics {
    /// Creates a new instance with all metrics registered.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests_total = CounterVec::new(
            Opts::new("searchproto_requests_total", "Total inbound calls by method"),
            &["method"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;

        let decode_failures_total = CounterVec::new(
            Opts::new(
                "searchproto_decode_failures_total",
                "Requests that failed to decode by method",
            ),
            &["method"],
        )?;
        registry.register(Box::new(decode_failures_total.clone()))?;

        let rejected_requests_total = CounterVec::new(
            Opts::new(
                "searchproto_rejected_requests_total",
                "Requests rejected during conversion by method and reason",
            ),
            &["method", "reason"],
        )?;
        registry.register(Box::new(rejected_requests_total.clone()))?;

        let inline_replies_total = CounterVec::new(
            Opts::new(
                "searchproto_inline_replies_total",
                "Replies returned synchronously by the domain server",
            ),
            &["method"],
        )?;
        registry.register(Box::new(inline_replies_total.clone()))?;

        let replies_total = CounterVec::new(
            Opts::new(
                "searchproto_replies_total",
                "Encoded replies by method and compression algorithm",
            ),
            &["method", "algorithm"],
        )?;
        registry.register(Box::new(replies_total.clone()))?;

        let reply_bytes = HistogramVec::new(
            HistogramOpts::new(
                "searchproto_reply_bytes",
                "Encoded reply payload size in bytes by method",
            )
            .buckets(REPLY_SIZE_BUCKETS.to_vec()),
            &["method"],
        )?;
        registry.register(Box::new(reply_bytes.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            decode_failures_total,
            rejected_requests_total,
            inline_replies_total,
            replies_total,
            reply_bytes,
        })
    }

    pub fn record_request(&self, kind: MessageKind) {
        self.requests_total.with_label_values(&[kind.as_str()]).inc();
    }

    pub fn record_decode_failure(&self, kind: MessageKind) {
        self.decode_failures_total
            .with_label_values(&[kind.as_str()])
            .inc();
    }

    pub fn record_rejected(&self, kind: MessageKind, reason: &str) {
        self.rejected_requests_total
            .with_label_values(&[kind.as_str(), reason])
            .inc();
    }

    pub fn record_inline_reply(&self, kind: MessageKind) {
        self.inline_replies_total
            .with_label_values(&[kind.as_str()])
            .inc();
    }

    pub fn record_reply(&self, kind: MessageKind, algorithm: CompressionType, payload_len: usize) {
        let algorithm = algorithm.to_string();
        self.replies_total
            .with_label_values(&[kind.as_str(), algorithm.as_str()])
            .inc();
        self.reply_bytes
            .with_label_values(&[kind.as_str()])
            .observe(payload_len as f64);
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<Vec<u8>, prometheus::Error> {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(buffer)
    }

    /// Renders all metrics as a string in Prometheus text format.
    pub fn gather_text(&self) -> Result<String, prometheus::Error> {
        TextEncoder::new().encode_to_string(&self.registry.gather())
    }

    /// Returns a reference to the registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = AdapterMetrics::new().unwrap();
        metrics.record_request(MessageKind::Search);
        metrics.record_request(MessageKind::Search);
        metrics.record_decode_failure(MessageKind::Monitor);
        metrics.record_rejected(MessageKind::Search, "NEGATIVE_FIELD");

        assert_eq!(
            metrics
                .requests_total
                .with_label_values(&["search"])
                .get(),
            2.0
        );
        assert_eq!(
            metrics
                .decode_failures_total
                .with_label_values(&["monitor"])
                .get(),
            1.0
        );
        assert_eq!(
            metrics
                .rejected_requests_total
                .with_label_values(&["search", "NEGATIVE_FIELD"])
                .get(),
            1.0
        );
    }

    #[test]
    fn test_metrics_text() {
        let metrics = AdapterMetrics::new().unwrap();
        metrics.record_reply(MessageKind::Docsum, CompressionType::Lz4, 300);
        metrics.record_inline_reply(MessageKind::Docsum);

        let text = metrics.gather_text().unwrap();
        assert!(text.contains("searchproto_replies_total"));
        assert!(text.contains("algorithm=\"lz4\""));
        assert!(text.contains("searchproto_reply_bytes_bucket"));
        assert!(text.contains("searchproto_inline_replies_total"));

        let bytes = metrics.encode().unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), text);
    }
}
