//! Domain requests.

use crate::global_id::GlobalId;
use crate::properties::PropertiesMap;
use crate::relative_time::RelativeTime;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::time::Duration;

/// Direction of a sort field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// One field of a sort specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Ascending,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Descending,
        }
    }
}

/// A query to execute.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    /// Anchored when the request was decoded.
    pub relative_time: RelativeTime,
    pub offset: u32,
    pub max_hits: u32,
    pub timeout: Duration,
    pub trace_level: u32,
    pub sort_spec: Vec<SortSpec>,
    pub session_id: String,
    pub document_type: String,
    pub rank_profile: String,
    pub properties: PropertiesMap,
    pub tensor_feature_overrides: BTreeMap<String, Bytes>,
    pub tensor_rank_properties: BTreeMap<String, Bytes>,
    /// Serialized grouping specification; opaque here.
    pub group_spec: Bytes,
    pub location: String,
    /// Serialized query tree; opaque here.
    pub stack_dump: Bytes,
    pub profile_depth: i32,
}

impl SearchRequest {
    pub fn new(relative_time: RelativeTime) -> Self {
        Self {
            relative_time,
            ..Default::default()
        }
    }

    /// Time remaining before the request's timeout elapses.
    pub fn time_left(&self) -> Duration {
        self.relative_time.time_left(self.timeout)
    }

    pub fn expired(&self) -> bool {
        self.relative_time.expired(self.timeout)
    }

    pub fn should_cache_query(&self) -> bool {
        self.properties.cache_enabled("query")
    }

    pub fn should_cache_grouping(&self) -> bool {
        self.properties.cache_enabled("grouping")
    }
}

/// A request for document summaries of previously returned hits.
#[derive(Debug, Clone, Default)]
pub struct DocsumRequest {
    /// Anchored when the request was decoded.
    pub relative_time: RelativeTime,
    pub timeout: Duration,
    pub session_id: String,
    pub document_type: String,
    pub result_class: String,
    pub dump_features: bool,
    pub rank_profile: String,
    pub properties: PropertiesMap,
    pub tensor_feature_overrides: BTreeMap<String, Bytes>,
    pub tensor_rank_properties: BTreeMap<String, Bytes>,
    pub location: String,
    pub stack_dump: Bytes,
    pub hits: Vec<GlobalId>,
    pub trace_level: u32,
}

impl DocsumRequest {
    pub fn new(relative_time: RelativeTime) -> Self {
        Self {
            relative_time,
            ..Default::default()
        }
    }

    pub fn time_left(&self) -> Duration {
        self.relative_time.time_left(self.timeout)
    }

    pub fn expired(&self) -> bool {
        self.relative_time.expired(self.timeout)
    }

    pub fn should_cache_query(&self) -> bool {
        self.properties.cache_enabled("query")
    }
}

/// A health probe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorRequest {
    /// Whether the reply should include the active document count.
    pub report_active_docs: bool,
}
