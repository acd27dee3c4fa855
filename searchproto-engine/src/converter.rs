//! Conversion between wire messages and domain objects.
//!
//! Requests are projected from the wire on the server side and onto the wire
//! on the client side; replies go the other way. Wire counts are signed, so
//! projecting onto the domain rejects negative values.

use crate::error::ConvertError;
use crate::global_id::GlobalId;
use crate::properties::{Properties, PropertiesMap};
use crate::relative_time::RelativeTime;
use crate::reply::{Coverage, DocsumReply, Hit, MonitorReply, SearchReply};
use crate::request::{DocsumRequest, MonitorRequest, SearchRequest, SortOrder, SortSpec};
use bytes::Bytes;
use searchproto_protocol::message as proto;
use std::collections::BTreeMap;
use std::time::Duration;

const CACHE_QUERY: &str = "query";
const CACHE_GROUPING: &str = "grouping";

/// Message used when an invalid reply carries no error text.
pub const DEFAULT_SEARCH_ERROR: &str = "search failed";

fn non_negative(field: &'static str, value: i32) -> Result<u32, ConvertError> {
    u32::try_from(value).map_err(|_| ConvertError::NegativeField {
        field,
        value: i64::from(value),
    })
}

fn non_negative_64(field: &'static str, value: i64) -> Result<u64, ConvertError> {
    u64::try_from(value).map_err(|_| ConvertError::NegativeField { field, value })
}

fn millis(field: &'static str, value: i32) -> Result<Duration, ConvertError> {
    non_negative(field, value).map(|ms| Duration::from_millis(u64::from(ms)))
}

fn saturating_i32(value: u64) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn saturating_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn duration_to_millis(duration: Duration) -> i32 {
    i32::try_from(duration.as_millis()).unwrap_or(i32::MAX)
}

fn sort_order_from_proto(value: i32) -> Result<SortOrder, ConvertError> {
    match proto::SortOrder::try_from(value) {
        Ok(proto::SortOrder::Ascending) => Ok(SortOrder::Ascending),
        Ok(proto::SortOrder::Descending) => Ok(SortOrder::Descending),
        Err(_) => Err(ConvertError::UnknownSortOrder(value)),
    }
}

fn sort_order_to_proto(order: SortOrder) -> i32 {
    match order {
        SortOrder::Ascending => proto::SortOrder::Ascending as i32,
        SortOrder::Descending => proto::SortOrder::Descending as i32,
    }
}

fn fill_properties(map: &mut PropertiesMap, name: &str, src: &[proto::StringProperty]) {
    if src.is_empty() {
        return;
    }
    let dst = map.lookup_create(name);
    for prop in src {
        for value in &prop.values {
            dst.add(prop.name.as_str(), value.as_str());
        }
    }
}

fn properties_to_proto(props: Option<&Properties>) -> Vec<proto::StringProperty> {
    props
        .map(|p| {
            p.iter()
                .map(|(name, values)| proto::StringProperty {
                    name: name.to_string(),
                    values: values.to_vec(),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn tensors_from_proto(src: Vec<proto::TensorProperty>) -> BTreeMap<String, Bytes> {
    src.into_iter().map(|t| (t.name, t.value)).collect()
}

fn tensors_to_proto(src: &BTreeMap<String, Bytes>) -> Vec<proto::TensorProperty> {
    src.iter()
        .map(|(name, value)| proto::TensorProperty {
            name: name.clone(),
            value: value.clone(),
        })
        .collect()
}

fn set_cache_flag(map: &mut PropertiesMap, cache: &str, enabled: bool) {
    if enabled {
        map.lookup_create(PropertiesMap::CACHES).add(cache, "true");
    }
}

pub fn search_request_from_proto(
    msg: proto::SearchRequest,
    relative_time: RelativeTime,
) -> Result<SearchRequest, ConvertError> {
    let mut request = SearchRequest::new(relative_time);
    request.offset = non_negative("offset", msg.offset)?;
    request.max_hits = non_negative("hits", msg.hits)?;
    request.timeout = millis("timeout", msg.timeout)?;
    request.trace_level = non_negative("trace_level", msg.trace_level)?;
    request.sort_spec = msg
        .sorting
        .iter()
        .map(|s| -> Result<SortSpec, ConvertError> {
            Ok(SortSpec {
                field: s.field.clone(),
                order: sort_order_from_proto(s.order)?,
            })
        })
        .collect::<Result<_, _>>()?;
    request.session_id = msg.session_key;
    request.document_type = msg.document_type;
    request.rank_profile = msg.rank_profile;

    let props = &mut request.properties;
    set_cache_flag(props, CACHE_GROUPING, msg.cache_grouping);
    set_cache_flag(props, CACHE_QUERY, msg.cache_query);
    fill_properties(props, PropertiesMap::FEATURE_OVERRIDES, &msg.feature_overrides);
    fill_properties(props, PropertiesMap::RANK, &msg.rank_properties);
    fill_properties(props, PropertiesMap::HIGHLIGHT_TERMS, &msg.highlight_terms);

    request.tensor_feature_overrides = tensors_from_proto(msg.tensor_feature_overrides);
    request.tensor_rank_properties = tensors_from_proto(msg.tensor_rank_properties);
    request.group_spec = msg.grouping_blob;
    request.location = msg.geo_location;
    request.stack_dump = msg.query_tree_blob;
    request.profile_depth = msg.profile_depth;
    Ok(request)
}

pub fn search_request_to_proto(request: &SearchRequest) -> proto::SearchRequest {
    let props = &request.properties;
    proto::SearchRequest {
        offset: saturating_i32(u64::from(request.offset)),
        hits: saturating_i32(u64::from(request.max_hits)),
        timeout: duration_to_millis(request.timeout),
        trace_level: saturating_i32(u64::from(request.trace_level)),
        sorting: request
            .sort_spec
            .iter()
            .map(|s| proto::SortField {
                order: sort_order_to_proto(s.order),
                field: s.field.clone(),
            })
            .collect(),
        session_key: request.session_id.clone(),
        document_type: request.document_type.clone(),
        cache_grouping: props.cache_enabled(CACHE_GROUPING),
        cache_query: props.cache_enabled(CACHE_QUERY),
        rank_profile: request.rank_profile.clone(),
        feature_overrides: properties_to_proto(props.feature_overrides()),
        tensor_feature_overrides: tensors_to_proto(&request.tensor_feature_overrides),
        rank_properties: properties_to_proto(props.rank_properties()),
        tensor_rank_properties: tensors_to_proto(&request.tensor_rank_properties),
        highlight_terms: properties_to_proto(props.highlight_terms()),
        grouping_blob: request.group_spec.clone(),
        geo_location: request.location.clone(),
        query_tree_blob: request.stack_dump.clone(),
        profile_depth: request.profile_depth,
    }
}

pub fn search_reply_to_proto(reply: &SearchReply) -> proto::SearchReply {
    let coverage = &reply.coverage;
    let mut msg = proto::SearchReply {
        total_hit_count: saturating_i64(reply.total_hit_count),
        coverage_docs: saturating_i64(coverage.covered()),
        active_docs: saturating_i64(coverage.active()),
        soon_active_docs: saturating_i64(coverage.soon_active()),
        degraded_by_match_phase: coverage.was_degraded_by_match_phase(),
        degraded_by_soft_timeout: coverage.was_degraded_by_timeout(),
        degraded_by_adaptive_timeout: coverage.was_degraded_by_adaptive_timeout(),
        slime_trace: reply.trace.clone(),
        ..Default::default()
    };

    if reply.valid {
        let has_sort_data = !reply.sort_index.is_empty();
        let sort_data_usable = reply.sort_index.len() == reply.hits.len() + 1;
        if has_sort_data && !sort_data_usable {
            tracing::warn!(
                "Dropping sort data: index has {} entries for {} hits",
                reply.sort_index.len(),
                reply.hits.len()
            );
        }
        msg.hits = reply
            .hits
            .iter()
            .enumerate()
            .map(|(i, hit)| proto::Hit {
                global_id: Bytes::copy_from_slice(hit.gid.as_bytes()),
                relevance: hit.metric,
                sort_data: if sort_data_usable {
                    reply
                        .sort_data_for(i)
                        .map(Bytes::copy_from_slice)
                        .unwrap_or_default()
                } else {
                    Bytes::new()
                },
            })
            .collect();
        msg.grouping_blob = reply.group_result.clone();
    }

    if reply.has_error() {
        let message = if reply.error_message.is_empty() {
            DEFAULT_SEARCH_ERROR.to_string()
        } else {
            reply.error_message.clone()
        };
        msg.errors.push(proto::Error { message });
    }
    msg
}

/// Projects a wire search reply.
///
/// The wire carries no error code; a reply with errors becomes invalid with
/// the error texts joined into `error_message`.
pub fn search_reply_from_proto(msg: proto::SearchReply) -> Result<SearchReply, ConvertError> {
    let mut reply = SearchReply::new();
    reply.total_hit_count = non_negative_64("total_hit_count", msg.total_hit_count)?;

    let mut coverage = Coverage::new(0);
    coverage
        .set_active(non_negative_64("active_docs", msg.active_docs)?)
        .set_covered(non_negative_64("coverage_docs", msg.coverage_docs)?)
        .set_soon_active(non_negative_64("soon_active_docs", msg.soon_active_docs)?);
    if msg.degraded_by_match_phase {
        coverage.degrade_match_phase();
    }
    if msg.degraded_by_soft_timeout {
        coverage.degrade_timeout();
    }
    if msg.degraded_by_adaptive_timeout {
        coverage.degrade_adaptive_timeout();
    }
    reply.coverage = coverage;

    let with_sort_data = msg.hits.iter().any(|h| !h.sort_data.is_empty());
    for hit in &msg.hits {
        let domain_hit = Hit::new(GlobalId::from_slice(&hit.global_id)?, hit.relevance);
        if with_sort_data {
            reply.push_sorted_hit(domain_hit, &hit.sort_data);
        } else {
            reply.hits.push(domain_hit);
        }
    }
    reply.max_rank = reply
        .hits
        .iter()
        .map(|h| h.metric)
        .fold(f64::NEG_INFINITY, f64::max);

    reply.group_result = msg.grouping_blob;
    reply.trace = msg.slime_trace;
    if !msg.errors.is_empty() {
        reply.valid = false;
        reply.error_message = msg
            .errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
    }
    Ok(reply)
}

pub fn docsum_request_from_proto(
    msg: proto::DocsumRequest,
    relative_time: RelativeTime,
) -> Result<DocsumRequest, ConvertError> {
    let mut request = DocsumRequest::new(relative_time);
    request.timeout = millis("timeout", msg.timeout)?;
    request.trace_level = non_negative("trace_level", msg.trace_level)?;
    request.session_id = msg.session_key;
    request.document_type = msg.document_type;
    request.result_class = msg.summary_class;
    request.dump_features = msg.dump_features;
    request.rank_profile = msg.rank_profile;

    let props = &mut request.properties;
    set_cache_flag(props, CACHE_QUERY, msg.cache_query);
    fill_properties(props, PropertiesMap::FEATURE_OVERRIDES, &msg.feature_overrides);
    fill_properties(props, PropertiesMap::RANK, &msg.rank_properties);
    fill_properties(props, PropertiesMap::HIGHLIGHT_TERMS, &msg.highlight_terms);

    request.tensor_feature_overrides = tensors_from_proto(msg.tensor_feature_overrides);
    request.tensor_rank_properties = tensors_from_proto(msg.tensor_rank_properties);
    request.location = msg.geo_location;
    request.stack_dump = msg.query_tree_blob;
    request.hits = msg
        .global_ids
        .iter()
        .map(|gid| GlobalId::from_slice(gid))
        .collect::<Result<_, _>>()?;
    Ok(request)
}

pub fn docsum_request_to_proto(request: &DocsumRequest) -> proto::DocsumRequest {
    let props = &request.properties;
    proto::DocsumRequest {
        timeout: duration_to_millis(request.timeout),
        session_key: request.session_id.clone(),
        document_type: request.document_type.clone(),
        summary_class: request.result_class.clone(),
        cache_query: props.cache_enabled(CACHE_QUERY),
        dump_features: request.dump_features,
        rank_profile: request.rank_profile.clone(),
        feature_overrides: properties_to_proto(props.feature_overrides()),
        tensor_feature_overrides: tensors_to_proto(&request.tensor_feature_overrides),
        rank_properties: properties_to_proto(props.rank_properties()),
        tensor_rank_properties: tensors_to_proto(&request.tensor_rank_properties),
        highlight_terms: properties_to_proto(props.highlight_terms()),
        geo_location: request.location.clone(),
        query_tree_blob: request.stack_dump.clone(),
        global_ids: request.hits.iter().map(|gid| gid.as_bytes().to_vec()).collect(),
        trace_level: saturating_i32(u64::from(request.trace_level)),
    }
}

pub fn docsum_reply_to_proto(reply: &DocsumReply) -> proto::DocsumReply {
    proto::DocsumReply {
        slime_summaries: reply.summaries.clone(),
        errors: reply
            .errors
            .iter()
            .map(|message| proto::Error {
                message: message.clone(),
            })
            .collect(),
        slime_trace: reply.trace.clone(),
    }
}

pub fn docsum_reply_from_proto(msg: proto::DocsumReply) -> DocsumReply {
    DocsumReply {
        summaries: msg.slime_summaries,
        errors: msg.errors.into_iter().map(|e| e.message).collect(),
        trace: msg.slime_trace,
    }
}

/// Requests from the wire always ask for the active document count.
pub fn monitor_request_from_proto(_msg: &proto::MonitorRequest) -> MonitorRequest {
    MonitorRequest {
        report_active_docs: true,
    }
}

pub fn monitor_request_to_proto(_request: &MonitorRequest) -> proto::MonitorRequest {
    proto::MonitorRequest {}
}

pub fn monitor_reply_to_proto(reply: &MonitorReply) -> proto::MonitorReply {
    proto::MonitorReply {
        online: reply.is_online(),
        active_docs: saturating_i64(reply.active_docs),
        distribution_key: saturating_i32(u64::from(reply.distribution_key)),
        is_blocking_writes: reply.is_blocking_writes,
    }
}

/// Projects a wire monitor reply. The wire only carries whether the node is
/// online, so an online node gets timestamp 1.
pub fn monitor_reply_from_proto(msg: proto::MonitorReply) -> Result<MonitorReply, ConvertError> {
    Ok(MonitorReply {
        distribution_key: non_negative("distribution_key", msg.distribution_key)?,
        timestamp: u64::from(msg.online),
        active_docs: non_negative_64("active_docs", msg.active_docs)?,
        is_blocking_writes: msg.is_blocking_writes,
    })
}
