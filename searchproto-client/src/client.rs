//! High-level client API.

use crate::codec;
use crate::error::ClientError;
use searchproto_engine::converter;
use searchproto_engine::{
    DocsumReply, DocsumRequest, MonitorReply, MonitorRequest, SearchReply, SearchRequest,
};
use searchproto_protocol::{
    CompletedCall, CompressionConfig, CompressionSettings, PendingReply, RpcRequest, Supervisor,
};
use std::sync::Arc;
use std::time::Duration;

/// Something that can carry a call to the methods and hand back its reply.
pub trait Transport: Send + Sync {
    fn invoke(&self, request: RpcRequest) -> PendingReply;
}

impl Transport for Supervisor {
    fn invoke(&self, request: RpcRequest) -> PendingReply {
        Supervisor::invoke(self, request)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn invoke(&self, request: RpcRequest) -> PendingReply {
        (**self).invoke(request)
    }
}

/// High-level client for the search protocol.
pub struct Client<T> {
    transport: T,
    compression: CompressionSettings,
    timeout: Option<Duration>,
}

impl<T: Transport> Client<T> {
    /// Creates a client that sends uncompressed requests.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            compression: CompressionSettings::new(CompressionConfig::raw()),
            timeout: None,
        }
    }

    pub fn with_compression(mut self, compression: CompressionSettings) -> Self {
        self.compression = compression;
        self
    }

    /// Bounds how long each call may take.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn compression(&self) -> &CompressionSettings {
        &self.compression
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn call(&self, request: RpcRequest) -> Result<CompletedCall, ClientError> {
        let method = request.method_name().to_string();
        let pending = self.transport.invoke(request);
        let completed = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, pending.wait())
                .await
                .map_err(|_| ClientError::Timeout)?,
            None => pending.wait().await,
        };
        if let Some(err) = completed.error() {
            tracing::debug!("Call to {} failed: {}", method, err);
        }
        Ok(completed)
    }

    /// Runs a search.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchReply, ClientError> {
        let msg = converter::search_request_to_proto(request);
        let mut rpc = RpcRequest::new();
        codec::encode_search_request(&msg, &self.compression.snapshot(), &mut rpc)?;

        let completed = self.call(rpc).await?;
        let reply = codec::decode_search_reply(&completed)?;
        Ok(converter::search_reply_from_proto(reply)?)
    }

    /// Fetches summaries for the hits named in `request`.
    pub async fn get_docsums(&self, request: &DocsumRequest) -> Result<DocsumReply, ClientError> {
        let msg = converter::docsum_request_to_proto(request);
        let mut rpc = RpcRequest::new();
        codec::encode_docsum_request(&msg, &self.compression.snapshot(), &mut rpc)?;

        let completed = self.call(rpc).await?;
        let reply = codec::decode_docsum_reply(&completed)?;
        Ok(converter::docsum_reply_from_proto(reply))
    }

    /// Pings the backend.
    pub async fn ping(&self) -> Result<MonitorReply, ClientError> {
        let msg = converter::monitor_request_to_proto(&MonitorRequest::default());
        let mut rpc = RpcRequest::new();
        codec::encode_monitor_request(&msg, &self.compression.snapshot(), &mut rpc)?;

        let completed = self.call(rpc).await?;
        let reply = codec::decode_monitor_reply(&completed)?;
        Ok(converter::monitor_reply_from_proto(reply)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use searchproto_engine::{
        Completion, DocsumClient, DocsumCompletion, DocsumServer, GlobalId, Hit, MonitorClient,
        MonitorCompletion, MonitorServer, RequestSource, SearchClient, SearchCompletion,
        SearchServer, SortSpec,
    };
    use searchproto_protocol::{CompressionType, RpcErrorCode, Values, PING_METHOD};
    use searchproto_server::ProtoRpcAdapter;

    struct EchoSearch;

    impl SearchServer for EchoSearch {
        fn search(
            &self,
            request: RequestSource<SearchRequest>,
            client: Box<dyn SearchClient>,
        ) -> SearchCompletion {
            let reply = match request.decode() {
                Some(request) => {
                    let mut reply = SearchReply::new();
                    reply.total_hit_count = u64::from(request.max_hits);
                    for i in 0..request.max_hits {
                        let key = format!("{}:{}", request.rank_profile, i);
                        reply.push_sorted_hit(
                            Hit::new(GlobalId::new([i as u8; 12]), f64::from(i)),
                            key.as_bytes(),
                        );
                    }
                    reply
                }
                None => SearchReply::failed(1, "bad request"),
            };
            Completion::Ready(reply, client)
        }
    }

    struct EchoDocsum;

    impl DocsumServer for EchoDocsum {
        fn get_docsums(
            &self,
            request: RequestSource<DocsumRequest>,
            client: Box<dyn DocsumClient>,
        ) -> DocsumCompletion {
            std::thread::spawn(move || {
                let reply = match request.decode() {
                    Some(request) => DocsumReply::new(Bytes::from(request.result_class)),
                    None => DocsumReply::failed("bad request"),
                };
                client.get_docsums_done(reply);
            });
            Completion::Deferred
        }
    }

    struct OnlineMonitor;

    impl MonitorServer for OnlineMonitor {
        fn ping(&self, _request: MonitorRequest, client: Box<dyn MonitorClient>) -> MonitorCompletion {
            let reply = MonitorReply {
                distribution_key: 7,
                timestamp: 1,
                active_docs: 1000,
                is_blocking_writes: false,
            };
            Completion::Ready(reply, client)
        }
    }

    fn serve() -> Arc<Supervisor> {
        let supervisor = Arc::new(Supervisor::new());
        ProtoRpcAdapter::new(
            Arc::new(EchoSearch),
            Arc::new(EchoDocsum),
            Arc::new(OnlineMonitor),
        )
        .register(&supervisor)
        .unwrap();
        supervisor
    }

    #[tokio::test]
    async fn test_search_end_to_end() {
        let client = Client::new(serve());

        let mut request = SearchRequest::default();
        request.max_hits = 3;
        request.rank_profile = "bm25".to_string();
        request.sort_spec.push(SortSpec::descending("year"));

        let reply = client.search(&request).await.unwrap();
        assert!(reply.valid);
        assert_eq!(reply.total_hit_count, 3);
        assert_eq!(reply.hits.len(), 3);
        assert_eq!(reply.hits[2].gid, GlobalId::new([2; 12]));
        assert_eq!(reply.sort_data_for(1), Some(&b"bm25:1"[..]));
        assert_eq!(reply.max_rank, 2.0);
    }

    #[tokio::test]
    async fn test_compressed_requests() {
        let settings = CompressionSettings::new(CompressionConfig::new(CompressionType::Zstd));
        let client = Client::new(serve()).with_compression(settings);

        let mut request = SearchRequest::default();
        request.max_hits = 1;
        request.rank_profile = "x".repeat(4096);
        let reply = client.search(&request).await.unwrap();
        assert_eq!(reply.hits.len(), 1);
    }

    #[tokio::test]
    async fn test_docsums_end_to_end() {
        let client = Client::new(serve());

        let mut request = DocsumRequest::default();
        request.result_class = "summary".to_string();
        request.hits.push(GlobalId::new([5; 12]));

        let reply = client.get_docsums(&request).await.unwrap();
        assert_eq!(reply.summaries.as_ref(), b"summary");
        assert!(reply.errors.is_empty());
    }

    #[tokio::test]
    async fn test_ping_end_to_end() {
        let client = Client::new(serve()).with_timeout(Duration::from_secs(5));

        let reply = client.ping().await.unwrap();
        assert!(reply.is_online());
        assert_eq!(reply.distribution_key, 7);
        assert_eq!(reply.active_docs, 1000);
    }

    struct Silent;

    impl Transport for Silent {
        fn invoke(&self, request: RpcRequest) -> PendingReply {
            let (call, pending) = searchproto_protocol::InboundCall::new(request);
            // Keep the call open so the reply never arrives.
            std::mem::forget(call);
            pending
        }
    }

    #[tokio::test]
    async fn test_timeout() {
        let client = Client::new(Silent).with_timeout(Duration::from_millis(20));
        let err = client.ping().await.unwrap_err();
        assert!(matches!(err, ClientError::Timeout));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_malformed_ping_surfaces_call_error() {
        let supervisor = serve();
        let mut params = Values::new();
        params.add_int8(0);
        params.add_int32(3);
        params.add_data(vec![0xFFu8, 0xFF, 0xFF]);

        let completed = supervisor
            .invoke(RpcRequest::with_method(PING_METHOD, params))
            .wait()
            .await;
        let err = ClientError::from(codec::decode_monitor_reply(&completed).unwrap_err());
        assert_eq!(err.call_error(), Some(RpcErrorCode::MethodFailed));
        assert!(!err.is_retryable());
    }
}
