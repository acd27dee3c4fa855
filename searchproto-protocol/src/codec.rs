//! Generic message codec.
//!
//! One encode/decode pair serves every message kind. The set of kinds is
//! closed: only the six messages in [`crate::message`] implement
//! [`WireMessage`].

use crate::compression::CompressionConfig;
use crate::envelope::Envelope;
use crate::error::ProtocolError;
use crate::message::{
    DocsumReply, DocsumRequest, MonitorReply, MonitorRequest, SearchReply, SearchRequest,
};
use crate::rpc::Values;
use crate::{DOCSUM_METHOD, MAX_MESSAGE_SIZE, PING_METHOD, SEARCH_METHOD};
use std::fmt;

/// The three request/reply cycles carried by the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Search,
    Docsum,
    Monitor,
}

impl MessageKind {
    /// Returns the RPC method that carries this kind.
    pub fn method_name(self) -> &'static str {
        match self {
            MessageKind::Search => SEARCH_METHOD,
            MessageKind::Docsum => DOCSUM_METHOD,
            MessageKind::Monitor => PING_METHOD,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Search => "search",
            MessageKind::Docsum => "docsum",
            MessageKind::Monitor => "monitor",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

mod sealed {
    pub trait Sealed {}
}

/// A protobuf message that may travel inside an envelope.
pub trait WireMessage: prost::Message + Default + sealed::Sealed {
    const KIND: MessageKind;
    const IS_REPLY: bool;
}

macro_rules! wire_message {
    ($ty:ty, $kind:expr, $reply:expr) => {
        impl sealed::Sealed for $ty {}
        impl WireMessage for $ty {
            const KIND: MessageKind = $kind;
            const IS_REPLY: bool = $reply;
        }
    };
}

wire_message!(SearchRequest, MessageKind::Search, false);
wire_message!(SearchReply, MessageKind::Search, true);
wire_message!(DocsumRequest, MessageKind::Docsum, false);
wire_message!(DocsumReply, MessageKind::Docsum, true);
wire_message!(MonitorRequest, MessageKind::Monitor, false);
wire_message!(MonitorReply, MessageKind::Monitor, true);

/// Serializes and compresses a message.
pub fn encode_message<M: WireMessage>(
    message: &M,
    config: &CompressionConfig,
) -> Result<Envelope, ProtocolError> {
    let size = message.encoded_len();
    if size > MAX_MESSAGE_SIZE as usize {
        return Err(ProtocolError::MessageTooLarge {
            size,
            max: MAX_MESSAGE_SIZE,
        });
    }
    Ok(Envelope::seal(config, message.encode_to_vec()))
}

/// Decompresses and parses a message.
pub fn decode_message<M: WireMessage>(envelope: &Envelope) -> Result<M, ProtocolError> {
    let bytes = envelope.open()?;
    Ok(M::decode(bytes)?)
}

/// Encodes a message and appends its envelope to `out`.
pub fn encode_into<M: WireMessage>(
    message: &M,
    config: &CompressionConfig,
    out: &mut Values,
) -> Result<(), ProtocolError> {
    let envelope = encode_message(message, config)?;
    envelope.write_to(out);
    Ok(())
}

/// Reads an envelope from `values` and decodes the message inside.
pub fn decode_from<M: WireMessage>(values: &Values) -> Result<M, ProtocolError> {
    let envelope = Envelope::read_from(values)?;
    decode_message(&envelope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::CompressionType;
    use crate::message::{Error, Hit, SortField, StringProperty};
    use bytes::Bytes;
    use prost::Message;
    use proptest::prelude::*;

    const ALGORITHMS: [CompressionType; 3] = [
        CompressionType::Raw,
        CompressionType::Lz4,
        CompressionType::Zstd,
    ];

    fn sample_reply() -> SearchReply {
        SearchReply {
            total_hit_count: 1000,
            coverage_docs: 500,
            active_docs: 600,
            hits: (0..50u8)
                .map(|i| Hit {
                    global_id: Bytes::from(vec![i; 12]),
                    relevance: f64::from(i) * 0.5,
                    sort_data: Bytes::new(),
                })
                .collect(),
            errors: vec![Error {
                message: "partial".to_string(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_kind_method_names() {
        assert_eq!(SearchRequest::KIND.method_name(), SEARCH_METHOD);
        assert_eq!(DocsumReply::KIND.method_name(), DOCSUM_METHOD);
        assert_eq!(MonitorRequest::KIND.method_name(), PING_METHOD);
        assert!(MonitorReply::IS_REPLY);
        assert!(!DocsumRequest::IS_REPLY);
        assert_eq!(MessageKind::Docsum.to_string(), "docsum");

        assert_eq!(SEARCH_METHOD, "vespa.searchprotocol.search");
        assert_eq!(DOCSUM_METHOD, "vespa.searchprotocol.getDocsums");
        assert_eq!(PING_METHOD, "vespa.searchprotocol.ping");
    }

    #[test]
    fn test_raw_payload_is_serialized_message() {
        let reply = sample_reply();
        let envelope = encode_message(&reply, &CompressionConfig::raw()).unwrap();
        assert_eq!(envelope.algorithm, CompressionType::Raw);
        assert_eq!(envelope.payload.as_ref(), reply.encode_to_vec().as_slice());
        assert_eq!(envelope.uncompressed_size as usize, reply.encoded_len());
    }

    #[test]
    fn test_declared_size_is_exact_for_every_algorithm() {
        let reply = sample_reply();
        for algorithm in ALGORITHMS {
            let config = CompressionConfig::new(algorithm).with_level(3);
            let envelope = encode_message(&reply, &config).unwrap();
            assert_eq!(envelope.uncompressed_size as usize, reply.encoded_len());

            let decoded: SearchReply = decode_message(&envelope).unwrap();
            assert_eq!(decoded, reply);
        }
    }

    #[test]
    fn test_tampered_size_fails() {
        let reply = sample_reply();
        for algorithm in ALGORITHMS {
            let config = CompressionConfig::new(algorithm).with_level(3);
            let mut envelope = encode_message(&reply, &config).unwrap();
            envelope.uncompressed_size += 1;
            let result: Result<SearchReply, _> = decode_message(&envelope);
            assert!(
                matches!(result, Err(ProtocolError::SizeMismatch { .. })),
                "{} should detect the size change",
                algorithm
            );
        }
    }

    #[test]
    fn test_shrunk_size_fails() {
        let reply = sample_reply();
        for algorithm in ALGORITHMS {
            let config = CompressionConfig::new(algorithm).with_level(3);
            let mut envelope = encode_message(&reply, &config).unwrap();
            envelope.uncompressed_size -= 3;
            let result: Result<SearchReply, _> = decode_message(&envelope);
            assert!(
                matches!(result, Err(ProtocolError::SizeMismatch { .. })),
                "{} should detect the size change",
                algorithm
            );
        }
    }

    #[test]
    fn test_values_round_trip() {
        let request = MonitorRequest::default();
        let mut values = Values::new();
        encode_into(&request, &CompressionConfig::default(), &mut values).unwrap();
        assert!(values.matches("bix"));

        let decoded: MonitorRequest = decode_from(&values).unwrap();
        assert_eq!(decoded, request);
    }

    #[test]
    fn test_garbage_payload_fails_to_parse() {
        let mut values = Values::new();
        values.add_int8(0);
        values.add_int32(3);
        values.add_data(vec![0xFFu8, 0xFF, 0xFF]);
        let result: Result<MonitorRequest, _> = decode_from(&values);
        assert!(matches!(result, Err(ProtocolError::Parse(_))));
    }

    fn string_property() -> impl Strategy<Value = StringProperty> {
        ("[a-z]{1,8}", prop::collection::vec("[a-z0-9 ]{0,12}", 0..3))
            .prop_map(|(name, values)| StringProperty { name, values })
    }

    fn search_request() -> impl Strategy<Value = SearchRequest> {
        (
            0i32..1000,
            0i32..1000,
            0i32..60_000,
            prop::collection::vec(("[a-z]{1,6}", 0i32..2), 0..3),
            "[a-z]{0,10}",
            any::<bool>(),
            prop::collection::vec(string_property(), 0..4),
            prop::collection::vec(any::<u8>(), 0..256),
        )
            .prop_map(
                |(offset, hits, timeout, sorting, rank_profile, cache_query, rank_properties, tree)| {
                    SearchRequest {
                        offset,
                        hits,
                        timeout,
                        sorting: sorting
                            .into_iter()
                            .map(|(field, order)| SortField { order, field })
                            .collect(),
                        rank_profile,
                        cache_query,
                        rank_properties,
                        query_tree_blob: Bytes::from(tree),
                        ..Default::default()
                    }
                },
            )
    }

    fn docsum_request() -> impl Strategy<Value = DocsumRequest> {
        (
            "[a-z]{0,10}",
            any::<bool>(),
            prop::collection::vec(prop::collection::vec(any::<u8>(), 12), 0..20),
        )
            .prop_map(|(summary_class, dump_features, global_ids)| DocsumRequest {
                summary_class,
                dump_features,
                global_ids,
                ..Default::default()
            })
    }

    fn monitor_reply() -> impl Strategy<Value = MonitorReply> {
        (any::<bool>(), 0i64..1_000_000, 0i32..64, any::<bool>()).prop_map(
            |(online, active_docs, distribution_key, is_blocking_writes)| MonitorReply {
                online,
                active_docs,
                distribution_key,
                is_blocking_writes,
            },
        )
    }

    fn search_reply() -> impl Strategy<Value = SearchReply> {
        (
            (0i64..1_000_000, 0i64..1_000_000, 0i64..1_000_000),
            (any::<bool>(), any::<bool>(), any::<bool>()),
            prop::collection::vec(
                (
                    prop::collection::vec(any::<u8>(), 12),
                    -1.0e6f64..1.0e6,
                    prop::collection::vec(any::<u8>(), 0..16),
                ),
                0..40,
            ),
            prop::collection::vec("[a-z ]{1,20}", 0..3),
            prop::collection::vec(any::<u8>(), 0..128),
        )
            .prop_map(|(docs, degraded, hits, errors, grouping)| SearchReply {
                total_hit_count: docs.0,
                coverage_docs: docs.1,
                active_docs: docs.2,
                degraded_by_match_phase: degraded.0,
                degraded_by_soft_timeout: degraded.1,
                degraded_by_adaptive_timeout: degraded.2,
                hits: hits
                    .into_iter()
                    .map(|(gid, relevance, sort_data)| Hit {
                        global_id: Bytes::from(gid),
                        relevance,
                        sort_data: Bytes::from(sort_data),
                    })
                    .collect(),
                errors: errors.into_iter().map(|message| Error { message }).collect(),
                grouping_blob: Bytes::from(grouping),
                ..Default::default()
            })
    }

    fn docsum_reply() -> impl Strategy<Value = DocsumReply> {
        (
            prop::collection::vec(any::<u8>(), 0..512),
            prop::collection::vec("[a-z ]{1,20}", 0..3),
            prop::collection::vec(any::<u8>(), 0..64),
        )
            .prop_map(|(summaries, errors, trace)| DocsumReply {
                slime_summaries: Bytes::from(summaries),
                errors: errors.into_iter().map(|message| Error { message }).collect(),
                slime_trace: Bytes::from(trace),
            })
    }

    fn algorithm() -> impl Strategy<Value = CompressionConfig> {
        let kind = prop_oneof![
            Just(CompressionType::Raw),
            Just(CompressionType::Lz4),
            Just(CompressionType::Zstd),
        ];
        (kind, 0u32..64).prop_map(|(t, min_size)| {
            CompressionConfig::new(t)
                .with_level(1)
                .with_min_size(min_size)
        })
    }

    proptest! {
        #[test]
        fn prop_search_request_round_trip(msg in search_request(), config in algorithm()) {
            let envelope = encode_message(&msg, &config).unwrap();
            prop_assert_eq!(envelope.uncompressed_size as usize, msg.encoded_len());
            let decoded: SearchRequest = decode_message(&envelope).unwrap();
            prop_assert_eq!(decoded, msg);
        }

        #[test]
        fn prop_docsum_request_round_trip(msg in docsum_request(), config in algorithm()) {
            let mut values = Values::new();
            encode_into(&msg, &config, &mut values).unwrap();
            let decoded: DocsumRequest = decode_from(&values).unwrap();
            prop_assert_eq!(decoded, msg);
        }

        #[test]
        fn prop_search_reply_round_trip(msg in search_reply(), config in algorithm()) {
            let envelope = encode_message(&msg, &config).unwrap();
            prop_assert_eq!(envelope.uncompressed_size as usize, msg.encoded_len());
            let decoded: SearchReply = decode_message(&envelope).unwrap();
            prop_assert_eq!(decoded, msg);
        }

        #[test]
        fn prop_docsum_reply_round_trip(msg in docsum_reply(), config in algorithm()) {
            let mut values = Values::new();
            encode_into(&msg, &config, &mut values).unwrap();
            let decoded: DocsumReply = decode_from(&values).unwrap();
            prop_assert_eq!(decoded, msg);
        }

        #[test]
        fn prop_monitor_request_round_trip(config in algorithm()) {
            let msg = MonitorRequest {};
            let envelope = encode_message(&msg, &config).unwrap();
            prop_assert_eq!(envelope.uncompressed_size, 0);
            let decoded: MonitorRequest = decode_message(&envelope).unwrap();
            prop_assert_eq!(decoded, msg);
        }

        #[test]
        fn prop_monitor_reply_round_trip(msg in monitor_reply(), config in algorithm()) {
            let envelope = encode_message(&msg, &config).unwrap();
            let decoded: MonitorReply = decode_message(&envelope).unwrap();
            prop_assert_eq!(decoded, msg);
        }
    }
}
