//! Lazy request decoders.
//!
//! A decoder holds the raw call parameters until the domain server asks for
//! the request. The relative time is anchored when decoding starts, so time
//! spent queued before that does not count against the request.

use crate::context::AdapterContext;
use searchproto_engine::converter;
use searchproto_engine::{DocsumRequest, RequestDecoder, SearchRequest};
use searchproto_protocol::message as proto;
use searchproto_protocol::{MessageKind, Values};

pub struct SearchRequestDecoder {
    params: Values,
    context: AdapterContext,
}

impl SearchRequestDecoder {
    pub fn new(params: Values, context: AdapterContext) -> Self {
        Self { params, context }
    }
}

impl RequestDecoder<SearchRequest> for SearchRequestDecoder {
    fn decode(self: Box<Self>) -> Option<SearchRequest> {
        let relative_time = self.context.relative_time();
        let msg: proto::SearchRequest = self.context.decode_request(&self.params)?;
        match converter::search_request_from_proto(msg, relative_time) {
            Ok(request) => Some(request),
            Err(e) => {
                self.context.conversion_failed(MessageKind::Search, &e);
                None
            }
        }
    }
}

pub struct DocsumRequestDecoder {
    params: Values,
    context: AdapterContext,
}

impl DocsumRequestDecoder {
    pub fn new(params: Values, context: AdapterContext) -> Self {
        Self { params, context }
    }
}

impl RequestDecoder<DocsumRequest> for DocsumRequestDecoder {
    fn decode(self: Box<Self>) -> Option<DocsumRequest> {
        let relative_time = self.context.relative_time();
        let msg: proto::DocsumRequest = self.context.decode_request(&self.params)?;
        match converter::docsum_request_from_proto(msg, relative_time) {
            Ok(request) => Some(request),
            Err(e) => {
                self.context.conversion_failed(MessageKind::Docsum, &e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::AdapterMetrics;
    use searchproto_engine::ManualClock;
    use searchproto_protocol::{encode_into, CompressionConfig};
    use std::sync::Arc;
    use std::time::Duration;

    fn params<M: searchproto_protocol::WireMessage>(msg: &M) -> Values {
        let mut values = Values::new();
        encode_into(msg, &CompressionConfig::default(), &mut values).unwrap();
        values
    }

    #[test]
    fn test_search_decoder() {
        let msg = proto::SearchRequest {
            hits: 10,
            timeout: 200,
            rank_profile: "default".to_string(),
            ..Default::default()
        };
        let decoder = Box::new(SearchRequestDecoder::new(
            params(&msg),
            AdapterContext::default(),
        ));

        let request = decoder.decode().unwrap();
        assert_eq!(request.max_hits, 10);
        assert_eq!(request.timeout, Duration::from_millis(200));
        assert_eq!(request.rank_profile, "default");
    }

    #[test]
    fn test_relative_time_anchored_at_decode() {
        let clock = Arc::new(ManualClock::new());
        let mut context = AdapterContext::default();
        context.set_clock(clock.clone());

        let msg = proto::SearchRequest {
            timeout: 100,
            ..Default::default()
        };
        let decoder = Box::new(SearchRequestDecoder::new(params(&msg), context));

        // Time spent before decoding is not charged to the request.
        clock.advance(Duration::from_secs(10));
        let request = decoder.decode().unwrap();
        assert!(!request.expired());
        assert_eq!(request.time_left(), Duration::from_millis(100));

        clock.advance(Duration::from_millis(60));
        assert_eq!(request.time_left(), Duration::from_millis(40));
    }

    #[test]
    fn test_corrupt_envelope_yields_none() {
        let metrics = Arc::new(AdapterMetrics::new().unwrap());
        let mut context = AdapterContext::default();
        context.set_metrics(metrics.clone());

        let mut values = Values::new();
        values.add_int8(6);
        values.add_int32(100);
        values.add_data(vec![0xF0u8, 0xFF, 0xFF]);
        let decoder = Box::new(SearchRequestDecoder::new(values, context));

        assert!(decoder.decode().is_none());
        assert_eq!(
            metrics
                .decode_failures_total
                .with_label_values(&["search"])
                .get(),
            1.0
        );
    }

    #[test]
    fn test_docsum_decoder_rejects_bad_gid() {
        let metrics = Arc::new(AdapterMetrics::new().unwrap());
        let mut context = AdapterContext::default();
        context.set_metrics(metrics.clone());

        let msg = proto::DocsumRequest {
            global_ids: vec![vec![1u8; 12], vec![2u8; 5]],
            ..Default::default()
        };
        let decoder = Box::new(DocsumRequestDecoder::new(params(&msg), context.clone()));
        assert!(decoder.decode().is_none());
        assert_eq!(
            metrics
                .decode_failures_total
                .with_label_values(&["docsum"])
                .get(),
            1.0
        );

        let msg = proto::DocsumRequest {
            global_ids: vec![vec![1u8; 12]],
            summary_class: "short".to_string(),
            ..Default::default()
        };
        let decoder = Box::new(DocsumRequestDecoder::new(params(&msg), context));
        let request = decoder.decode().unwrap();
        assert_eq!(request.hits.len(), 1);
        assert_eq!(request.result_class, "short");
    }
}
