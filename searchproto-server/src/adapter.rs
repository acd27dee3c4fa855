//! Protocol adapter.
//!
//! Registers the search, docsum and ping methods and bridges each inbound
//! call to its domain server. All three methods take and return one
//! envelope `(u8 algorithm, i32 uncompressed_size, bytes payload)`.
//!
//! Search and docsum calls hand the server a lazy decoder; a request that
//! fails to decode reaches the server as `None` and the server decides how
//! to fail the call. Ping requests are decoded eagerly and a malformed one
//! is answered here without involving the monitor server.

use crate::completion::{DocsumCompletionHandler, PingCompletionHandler, SearchCompletionHandler};
use crate::config::Config;
use crate::context::AdapterContext;
use crate::decoder::{DocsumRequestDecoder, SearchRequestDecoder};
use crate::error::ServerError;
use crate::metrics::AdapterMetrics;
use searchproto_engine::converter;
use searchproto_engine::{
    Clock, Completion, DocsumServer, MonitorServer, RequestSource, SearchServer,
};
use searchproto_protocol::message as proto;
use searchproto_protocol::{
    CompressionSettings, InboundCall, MessageKind, MethodSpec, RpcErrorCode, Supervisor,
    DOCSUM_METHOD, ENVELOPE_TYPES, PING_METHOD, SEARCH_METHOD,
};
use std::sync::Arc;

/// Error text returned for a ping whose request cannot be decoded.
pub const MALFORMED_MONITOR_REQUEST: &str = "malformed monitor request";

/// Bridges RPC calls to the search, docsum and monitor servers.
pub struct ProtoRpcAdapter {
    search: Arc<dyn SearchServer>,
    docsum: Arc<dyn DocsumServer>,
    monitor: Arc<dyn MonitorServer>,
    context: AdapterContext,
}

impl ProtoRpcAdapter {
    pub fn new(
        search: Arc<dyn SearchServer>,
        docsum: Arc<dyn DocsumServer>,
        monitor: Arc<dyn MonitorServer>,
    ) -> Self {
        Self {
            search,
            docsum,
            monitor,
            context: AdapterContext::default(),
        }
    }

    /// Uses a shared compression handle for encoding replies.
    pub fn with_compression(mut self, compression: CompressionSettings) -> Self {
        self.context.set_compression(compression);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<AdapterMetrics>) -> Self {
        self.context.set_metrics(metrics);
        self
    }

    /// Applies validated configuration: reply compression, and metrics when
    /// they are enabled.
    pub fn with_config(self, config: &Config) -> Result<Self, ServerError> {
        config.validate()?;
        let adapter = self.with_compression(config.compression_settings());
        if !config.metrics.enabled {
            return Ok(adapter);
        }
        Ok(adapter.with_metrics(Arc::new(AdapterMetrics::new()?)))
    }

    /// Sets the clock that anchors request relative time.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.context.set_clock(clock);
        self
    }

    pub fn compression(&self) -> &CompressionSettings {
        self.context.compression()
    }

    pub fn context(&self) -> &AdapterContext {
        &self.context
    }

    /// Registers the three protocol methods with `supervisor`.
    pub fn register(self, supervisor: &Supervisor) -> Result<Arc<Self>, ServerError> {
        let adapter = Arc::new(self);

        let this = Arc::clone(&adapter);
        supervisor.define_method(
            envelope_method(SEARCH_METHOD, "Performs a search operation"),
            Arc::new(move |call: InboundCall| this.rpc_search(call)),
        )?;

        let this = Arc::clone(&adapter);
        supervisor.define_method(
            envelope_method(DOCSUM_METHOD, "Fetches document summaries"),
            Arc::new(move |call: InboundCall| this.rpc_get_docsums(call)),
        )?;

        let this = Arc::clone(&adapter);
        supervisor.define_method(
            envelope_method(PING_METHOD, "Checks whether the backend is online"),
            Arc::new(move |call: InboundCall| this.rpc_ping(call)),
        )?;

        tracing::info!(
            "Registered protocol methods: {}, {}, {}",
            SEARCH_METHOD,
            DOCSUM_METHOD,
            PING_METHOD
        );
        Ok(adapter)
    }

    /// Serves one search call.
    pub fn rpc_search(&self, call: InboundCall) {
        let (params, handle) = call.detach();
        self.context.record_request(MessageKind::Search);

        let client = Box::new(SearchCompletionHandler::new(handle, self.context.clone()));
        let decoder = Box::new(SearchRequestDecoder::new(params, self.context.clone()));
        match self.search.search(RequestSource::from_decoder(decoder), client) {
            Completion::Ready(reply, client) => {
                self.context.record_inline_reply(MessageKind::Search);
                client.search_done(reply);
            }
            Completion::Deferred => tracing::trace!("Search reply deferred"),
        }
    }

    /// Serves one docsum call.
    pub fn rpc_get_docsums(&self, call: InboundCall) {
        let (params, handle) = call.detach();
        self.context.record_request(MessageKind::Docsum);

        let client = Box::new(DocsumCompletionHandler::new(handle, self.context.clone()));
        let decoder = Box::new(DocsumRequestDecoder::new(params, self.context.clone()));
        match self
            .docsum
            .get_docsums(RequestSource::from_decoder(decoder), client)
        {
            Completion::Ready(reply, client) => {
                self.context.record_inline_reply(MessageKind::Docsum);
                client.get_docsums_done(reply);
            }
            Completion::Deferred => tracing::trace!("Docsum reply deferred"),
        }
    }

    /// Serves one ping call.
    pub fn rpc_ping(&self, call: InboundCall) {
        let (params, handle) = call.detach();
        self.context.record_request(MessageKind::Monitor);

        let Some(msg) = self.context.decode_request::<proto::MonitorRequest>(&params) else {
            handle.fail(RpcErrorCode::MethodFailed, MALFORMED_MONITOR_REQUEST);
            return;
        };

        let request = converter::monitor_request_from_proto(&msg);
        let client = Box::new(PingCompletionHandler::new(handle, self.context.clone()));
        match self.monitor.ping(request, client) {
            Completion::Ready(reply, client) => {
                self.context.record_inline_reply(MessageKind::Monitor);
                client.ping_done(reply);
            }
            Completion::Deferred => tracing::trace!("Ping reply deferred"),
        }
    }
}

fn envelope_method(name: &str, description: &str) -> MethodSpec {
    MethodSpec::new(name, ENVELOPE_TYPES, ENVELOPE_TYPES)
        .with_description(description)
        .param("encoding", "Compression algorithm of the payload")
        .param("uncompressed_size", "Size of the payload after decompression")
        .param("message", "Serialized request")
        .returns("encoding", "Compression algorithm of the payload")
        .returns("uncompressed_size", "Size of the payload after decompression")
        .returns("message", "Serialized reply")
}
