//! Domain replies.

use crate::global_id::GlobalId;
use crate::properties::PropertiesMap;
use bytes::Bytes;

/// How much of the corpus a search reply covers.
///
/// Setters keep `covered <= active` and `nodes_replied <= nodes_queried`;
/// set the upper bound first. Degrade reasons only accumulate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Coverage {
    active: u64,
    covered: u64,
    soon_active: u64,
    nodes_queried: u16,
    nodes_replied: u16,
    degrade_reason: u32,
}

impl Coverage {
    /// The match phase was cut short by a hit limit.
    pub const MATCH_PHASE: u32 = 0x1;
    /// The query hit its soft timeout.
    pub const TIMEOUT: u32 = 0x2;
    /// An adaptive timeout cut the query short.
    pub const ADAPTIVE_TIMEOUT: u32 = 0x4;

    /// Full coverage of `active` documents on one node.
    pub fn new(active: u64) -> Self {
        Self {
            active,
            covered: active,
            soon_active: active,
            nodes_queried: 1,
            nodes_replied: 1,
            degrade_reason: 0,
        }
    }

    pub fn active(&self) -> u64 {
        self.active
    }

    pub fn covered(&self) -> u64 {
        self.covered
    }

    pub fn soon_active(&self) -> u64 {
        self.soon_active
    }

    pub fn nodes_queried(&self) -> u16 {
        self.nodes_queried
    }

    pub fn nodes_replied(&self) -> u16 {
        self.nodes_replied
    }

    pub fn degrade_reason(&self) -> u32 {
        self.degrade_reason
    }

    pub fn set_active(&mut self, active: u64) -> &mut Self {
        self.active = active;
        self.covered = self.covered.min(active);
        self
    }

    pub fn set_covered(&mut self, covered: u64) -> &mut Self {
        self.covered = covered.min(self.active);
        self
    }

    pub fn set_soon_active(&mut self, soon_active: u64) -> &mut Self {
        self.soon_active = soon_active;
        self
    }

    pub fn set_nodes_queried(&mut self, nodes: u16) -> &mut Self {
        self.nodes_queried = nodes;
        self.nodes_replied = self.nodes_replied.min(nodes);
        self
    }

    pub fn set_nodes_replied(&mut self, nodes: u16) -> &mut Self {
        self.nodes_replied = nodes.min(self.nodes_queried);
        self
    }

    /// Adds degrade reason bits; existing bits are kept.
    pub fn degrade(&mut self, reason: u32) -> &mut Self {
        self.degrade_reason |= reason;
        self
    }

    pub fn degrade_match_phase(&mut self) -> &mut Self {
        self.degrade(Self::MATCH_PHASE)
    }

    pub fn degrade_timeout(&mut self) -> &mut Self {
        self.degrade(Self::TIMEOUT)
    }

    pub fn degrade_adaptive_timeout(&mut self) -> &mut Self {
        self.degrade(Self::ADAPTIVE_TIMEOUT)
    }

    pub fn was_degraded_by_match_phase(&self) -> bool {
        self.degrade_reason & Self::MATCH_PHASE != 0
    }

    pub fn was_degraded_by_timeout(&self) -> bool {
        self.degrade_reason & Self::TIMEOUT != 0
    }

    pub fn was_degraded_by_adaptive_timeout(&self) -> bool {
        self.degrade_reason & Self::ADAPTIVE_TIMEOUT != 0
    }

    pub fn is_degraded(&self) -> bool {
        self.degrade_reason != 0
    }
}

/// One matching document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub gid: GlobalId,
    pub metric: f64,
    /// Routing path used by follow-up summary fetches.
    pub path: u64,
    pub distribution_key: u32,
}

impl Hit {
    pub fn new(gid: GlobalId, metric: f64) -> Self {
        Self {
            gid,
            metric,
            path: 0,
            distribution_key: 0,
        }
    }
}

/// Result of a query.
///
/// When `valid` is false only the error fields are meaningful; hits and the
/// grouping result are ignored by consumers.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchReply {
    pub valid: bool,
    pub offset: u32,
    pub distribution_key: u32,
    pub total_hit_count: u64,
    pub max_rank: f64,
    /// Offsets into `sort_data`, one per hit plus a final end offset.
    pub sort_index: Vec<u32>,
    pub sort_data: Vec<u8>,
    /// Serialized grouping result; opaque here.
    pub group_result: Bytes,
    pub coverage: Coverage,
    pub hits: Vec<Hit>,
    pub properties: PropertiesMap,
    pub trace: Bytes,
    pub error_code: u32,
    pub error_message: String,
}

impl Default for SearchReply {
    fn default() -> Self {
        Self {
            valid: true,
            offset: 0,
            distribution_key: 0,
            total_hit_count: 0,
            max_rank: f64::NEG_INFINITY,
            sort_index: Vec::new(),
            sort_data: Vec::new(),
            group_result: Bytes::new(),
            coverage: Coverage::default(),
            hits: Vec::new(),
            properties: PropertiesMap::default(),
            trace: Bytes::new(),
            error_code: 0,
            error_message: String::new(),
        }
    }
}

impl SearchReply {
    pub fn new() -> Self {
        Self::default()
    }

    /// An invalid reply carrying an error.
    pub fn failed(error_code: u32, error_message: impl Into<String>) -> Self {
        Self {
            valid: false,
            error_code,
            error_message: error_message.into(),
            ..Default::default()
        }
    }

    pub fn has_error(&self) -> bool {
        !self.valid || self.error_code != 0
    }

    /// Returns the sort data of hit `index`, if the sort index is consistent.
    pub fn sort_data_for(&self, index: usize) -> Option<&[u8]> {
        if self.sort_index.len() != self.hits.len() + 1 {
            return None;
        }
        let start = *self.sort_index.get(index)? as usize;
        let end = *self.sort_index.get(index + 1)? as usize;
        self.sort_data.get(start..end)
    }

    /// Appends a hit together with its sort data.
    pub fn push_sorted_hit(&mut self, hit: Hit, sort_data: &[u8]) {
        if self.sort_index.is_empty() {
            self.sort_index.push(self.sort_data.len() as u32);
        }
        self.hits.push(hit);
        self.sort_data.extend_from_slice(sort_data);
        self.sort_index.push(self.sort_data.len() as u32);
    }
}

/// Result of a summary fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocsumReply {
    /// Serialized summaries; opaque here.
    pub summaries: Bytes,
    pub errors: Vec<String>,
    pub trace: Bytes,
}

impl DocsumReply {
    pub fn new(summaries: Bytes) -> Self {
        Self {
            summaries,
            ..Default::default()
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
            ..Default::default()
        }
    }
}

/// Result of a health probe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorReply {
    pub distribution_key: u32,
    /// Non-zero when the node is online.
    pub timestamp: u64,
    pub active_docs: u64,
    pub is_blocking_writes: bool,
}

impl MonitorReply {
    pub fn is_online(&self) -> bool {
        self.timestamp != 0
    }
}
