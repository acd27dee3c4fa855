//! Domain-server interfaces.
//!
//! A domain server receives a request source and a single-use client for
//! each call. It either returns [`Completion::Ready`] with the reply and the
//! client it was given, and the caller completes the call inline, or it
//! returns [`Completion::Deferred`] after taking over the client, which it
//! must later consume with exactly one `*_done` call.
//!
//! Clients and decoders take `self: Box<Self>`, so each can be used at most
//! once.

use crate::reply::{DocsumReply, MonitorReply, SearchReply};
use crate::request::{DocsumRequest, MonitorRequest, SearchRequest};
use std::fmt;

/// Produces a request on demand. Decoding happens when asked, not before.
pub trait RequestDecoder<R>: Send {
    /// Decodes the request; `None` means it could not be decoded and the
    /// call must be failed without further processing.
    fn decode(self: Box<Self>) -> Option<R>;
}

/// Either a decoded request or a decoder that yields one when asked.
pub enum RequestSource<R> {
    Request(R),
    Decoder(Box<dyn RequestDecoder<R>>),
}

impl<R> RequestSource<R> {
    pub fn from_request(request: R) -> Self {
        RequestSource::Request(request)
    }

    pub fn from_decoder(decoder: Box<dyn RequestDecoder<R>>) -> Self {
        RequestSource::Decoder(decoder)
    }

    /// Returns the request, decoding it first if needed.
    pub fn decode(self) -> Option<R> {
        match self {
            RequestSource::Request(request) => Some(request),
            RequestSource::Decoder(decoder) => decoder.decode(),
        }
    }
}

impl<R> fmt::Debug for RequestSource<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestSource::Request(_) => f.write_str("RequestSource::Request"),
            RequestSource::Decoder(_) => f.write_str("RequestSource::Decoder"),
        }
    }
}

/// Outcome of handing a call to a domain server.
pub enum Completion<R, C> {
    /// The reply is ready; the caller completes the call with `C`.
    Ready(R, C),
    /// The server kept the client and will complete the call itself.
    Deferred,
}

impl<R, C> Completion<R, C> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Completion::Ready(..))
    }
}

impl<R, C> fmt::Debug for Completion<R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Completion::Ready(..) => f.write_str("Completion::Ready"),
            Completion::Deferred => f.write_str("Completion::Deferred"),
        }
    }
}

pub trait SearchClient: Send {
    fn search_done(self: Box<Self>, reply: SearchReply);
}

pub trait DocsumClient: Send {
    fn get_docsums_done(self: Box<Self>, reply: DocsumReply);
}

pub trait MonitorClient: Send {
    fn ping_done(self: Box<Self>, reply: MonitorReply);
}

pub type SearchCompletion = Completion<SearchReply, Box<dyn SearchClient>>;
pub type DocsumCompletion = Completion<DocsumReply, Box<dyn DocsumClient>>;
pub type MonitorCompletion = Completion<MonitorReply, Box<dyn MonitorClient>>;

/// Executes queries.
pub trait SearchServer: Send + Sync {
    fn search(
        &self,
        request: RequestSource<SearchRequest>,
        client: Box<dyn SearchClient>,
    ) -> SearchCompletion;
}

/// Fetches document summaries.
pub trait DocsumServer: Send + Sync {
    fn get_docsums(
        &self,
        request: RequestSource<DocsumRequest>,
        client: Box<dyn DocsumClient>,
    ) -> DocsumCompletion;
}

/// Answers health probes.
pub trait MonitorServer: Send + Sync {
    fn ping(&self, request: MonitorRequest, client: Box<dyn MonitorClient>) -> MonitorCompletion;
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct FixedDecoder(Option<MonitorRequest>);

    impl RequestDecoder<MonitorRequest> for FixedDecoder {
        fn decode(self: Box<Self>) -> Option<MonitorRequest> {
            self.0
        }
    }

    struct Recorder(Arc<Mutex<Vec<MonitorReply>>>);

    impl MonitorClient for Recorder {
        fn ping_done(self: Box<Self>, reply: MonitorReply) {
            self.0.lock().push(reply);
        }
    }

    struct Immediate;

    impl MonitorServer for Immediate {
        fn ping(&self, request: MonitorRequest, client: Box<dyn MonitorClient>) -> MonitorCompletion {
            let reply = MonitorReply {
                active_docs: if request.report_active_docs { 7 } else { 0 },
                timestamp: 1,
                ..Default::default()
            };
            Completion::Ready(reply, client)
        }
    }

    #[test]
    fn test_request_source() {
        let direct = RequestSource::from_request(MonitorRequest {
            report_active_docs: true,
        });
        assert!(direct.decode().unwrap().report_active_docs);

        let lazy = RequestSource::from_decoder(Box::new(FixedDecoder(None)));
        assert_eq!(format!("{:?}", lazy), "RequestSource::Decoder");
        assert!(lazy.decode().is_none());
    }

    #[test]
    fn test_ready_completion_hands_back_client() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let server = Immediate;
        let completion = server.ping(
            MonitorRequest {
                report_active_docs: true,
            },
            Box::new(Recorder(seen.clone())),
        );
        assert!(completion.is_ready());

        if let Completion::Ready(reply, client) = completion {
            client.ping_done(reply);
        }
        let seen = seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].active_docs, 7);
    }
}
