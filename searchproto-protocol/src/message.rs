//! Wire-level protobuf messages.
//!
//! These are the structured forms that travel inside an [`Envelope`]. They
//! mirror the search protocol schema field for field; tags must never be
//! renumbered.
//!
//! [`Envelope`]: crate::envelope::Envelope

use bytes::Bytes;

/// A named multi-valued string property.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StringProperty {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, repeated, tag = "2")]
    pub values: Vec<String>,
}

/// A named property holding a serialized tensor.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TensorProperty {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(bytes = "bytes", tag = "2")]
    pub value: Bytes,
}

/// Sort direction of a [`SortField`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum SortOrder {
    Ascending = 0,
    Descending = 1,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SortField {
    #[prost(enumeration = "SortOrder", tag = "1")]
    pub order: i32,
    #[prost(string, tag = "2")]
    pub field: String,
}

/// An error reported by the backend in a reply.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Error {
    #[prost(string, tag = "1")]
    pub message: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SearchRequest {
    #[prost(int32, tag = "1")]
    pub offset: i32,
    #[prost(int32, tag = "2")]
    pub hits: i32,
    /// Milliseconds.
    #[prost(int32, tag = "3")]
    pub timeout: i32,
    #[prost(int32, tag = "4")]
    pub trace_level: i32,
    #[prost(message, repeated, tag = "5")]
    pub sorting: Vec<SortField>,
    #[prost(string, tag = "6")]
    pub session_key: String,
    #[prost(string, tag = "7")]
    pub document_type: String,
    #[prost(bool, tag = "8")]
    pub cache_grouping: bool,
    #[prost(bool, tag = "9")]
    pub cache_query: bool,
    #[prost(string, tag = "10")]
    pub rank_profile: String,
    #[prost(message, repeated, tag = "11")]
    pub feature_overrides: Vec<StringProperty>,
    #[prost(message, repeated, tag = "12")]
    pub tensor_feature_overrides: Vec<TensorProperty>,
    #[prost(message, repeated, tag = "13")]
    pub rank_properties: Vec<StringProperty>,
    #[prost(message, repeated, tag = "14")]
    pub tensor_rank_properties: Vec<TensorProperty>,
    #[prost(message, repeated, tag = "15")]
    pub highlight_terms: Vec<StringProperty>,
    #[prost(bytes = "bytes", tag = "16")]
    pub grouping_blob: Bytes,
    #[prost(string, tag = "17")]
    pub geo_location: String,
    #[prost(bytes = "bytes", tag = "18")]
    pub query_tree_blob: Bytes,
    #[prost(int32, tag = "19")]
    pub profile_depth: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Hit {
    #[prost(bytes = "bytes", tag = "1")]
    pub global_id: Bytes,
    #[prost(double, tag = "2")]
    pub relevance: f64,
    #[prost(bytes = "bytes", tag = "3")]
    pub sort_data: Bytes,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SearchReply {
    #[prost(int64, tag = "1")]
    pub total_hit_count: i64,
    #[prost(int64, tag = "2")]
    pub coverage_docs: i64,
    #[prost(int64, tag = "3")]
    pub active_docs: i64,
    #[prost(int64, tag = "4")]
    pub soon_active_docs: i64,
    #[prost(bool, tag = "5")]
    pub degraded_by_match_phase: bool,
    #[prost(bool, tag = "6")]
    pub degraded_by_soft_timeout: bool,
    #[prost(message, repeated, tag = "7")]
    pub hits: Vec<Hit>,
    #[prost(bytes = "bytes", tag = "10")]
    pub grouping_blob: Bytes,
    #[prost(message, repeated, tag = "11")]
    pub errors: Vec<Error>,
    #[prost(bytes = "bytes", tag = "12")]
    pub slime_trace: Bytes,
    #[prost(bool, tag = "13")]
    pub degraded_by_adaptive_timeout: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DocsumRequest {
    /// Milliseconds.
    #[prost(int32, tag = "1")]
    pub timeout: i32,
    #[prost(string, tag = "2")]
    pub session_key: String,
    #[prost(string, tag = "3")]
    pub document_type: String,
    #[prost(string, tag = "4")]
    pub summary_class: String,
    #[prost(bool, tag = "5")]
    pub cache_query: bool,
    #[prost(bool, tag = "6")]
    pub dump_features: bool,
    #[prost(string, tag = "7")]
    pub rank_profile: String,
    #[prost(message, repeated, tag = "8")]
    pub feature_overrides: Vec<StringProperty>,
    #[prost(message, repeated, tag = "9")]
    pub tensor_feature_overrides: Vec<TensorProperty>,
    #[prost(message, repeated, tag = "10")]
    pub rank_properties: Vec<StringProperty>,
    #[prost(message, repeated, tag = "11")]
    pub tensor_rank_properties: Vec<TensorProperty>,
    #[prost(message, repeated, tag = "12")]
    pub highlight_terms: Vec<StringProperty>,
    #[prost(string, tag = "13")]
    pub geo_location: String,
    #[prost(bytes = "bytes", tag = "14")]
    pub query_tree_blob: Bytes,
    #[prost(bytes = "vec", repeated, tag = "15")]
    pub global_ids: Vec<Vec<u8>>,
    #[prost(int32, tag = "16")]
    pub trace_level: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DocsumReply {
    #[prost(bytes = "bytes", tag = "1")]
    pub slime_summaries: Bytes,
    #[prost(message, repeated, tag = "2")]
    pub errors: Vec<Error>,
    #[prost(bytes = "bytes", tag = "3")]
    pub slime_trace: Bytes,
}

/// Health probe. Carries no fields.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MonitorRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MonitorReply {
    #[prost(bool, tag = "1")]
    pub online: bool,
    #[prost(int64, tag = "2")]
    pub active_docs: i64,
    #[prost(int32, tag = "3")]
    pub distribution_key: i32,
    #[prost(bool, tag = "4")]
    pub is_blocking_writes: bool,
}
