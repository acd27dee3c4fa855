//! # searchproto-engine
//!
//! Domain model of the search backend boundary.
//!
//! This crate provides:
//! - Domain requests and replies for search, docsum and monitor cycles
//! - Coverage accounting and global document ids
//! - A relative-time clock captured when a request is decoded
//! - The traits domain servers implement, and the completion tokens they reply through
//! - Conversion between wire messages and domain objects

pub mod api;
pub mod converter;
pub mod error;
pub mod global_id;
pub mod properties;
pub mod relative_time;
pub mod reply;
pub mod request;

pub use api::{
    Completion, DocsumClient, DocsumCompletion, DocsumServer, MonitorClient, MonitorCompletion,
    MonitorServer, RequestDecoder, RequestSource, SearchClient, SearchCompletion, SearchServer,
};
pub use error::ConvertError;
pub use global_id::GlobalId;
pub use properties::{Properties, PropertiesMap};
pub use relative_time::{Clock, ManualClock, RelativeTime, SteadyClock};
pub use reply::{Coverage, DocsumReply, Hit, MonitorReply, SearchReply};
pub use request::{DocsumRequest, MonitorRequest, SearchRequest, SortOrder, SortSpec};
