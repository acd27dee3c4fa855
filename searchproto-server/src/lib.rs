//! # searchproto-server
//!
//! Server side of the search protocol boundary.
//!
//! This crate provides:
//! - The protocol adapter that registers the search, docsum and ping methods
//! - Lazy request decoders handed to domain servers
//! - Single-use completion handlers that encode replies
//! - Configuration loading (YAML file plus environment overrides)
//! - Prometheus metrics for adapter traffic

pub mod adapter;
pub mod completion;
pub mod config;
pub mod context;
pub mod decoder;
pub mod error;
pub mod metrics;

pub use adapter::{ProtoRpcAdapter, MALFORMED_MONITOR_REQUEST};
pub use completion::{DocsumCompletionHandler, PingCompletionHandler, SearchCompletionHandler};
pub use config::{Config, ConfigError, MetricsConfig};
pub use context::AdapterContext;
pub use decoder::{DocsumRequestDecoder, SearchRequestDecoder};
pub use error::ServerError;
pub use metrics::AdapterMetrics;
