//! Completion handlers.
//!
//! Each handler owns the return path of one call. Completing consumes it;
//! the domain reply is converted, encoded and written back as the call's
//! return values.

use crate::context::AdapterContext;
use searchproto_engine::converter;
use searchproto_engine::{
    DocsumClient, DocsumReply, MonitorClient, MonitorReply, SearchClient, SearchReply,
};
use searchproto_protocol::ReturnHandle;

pub struct SearchCompletionHandler {
    handle: ReturnHandle,
    context: AdapterContext,
}

impl SearchCompletionHandler {
    pub fn new(handle: ReturnHandle, context: AdapterContext) -> Self {
        Self { handle, context }
    }
}

impl SearchClient for SearchCompletionHandler {
    fn search_done(self: Box<Self>, reply: SearchReply) {
        let Self { handle, context } = *self;
        let msg = converter::search_reply_to_proto(&reply);
        context.return_reply(&msg, handle);
    }
}

pub struct DocsumCompletionHandler {
    handle: ReturnHandle,
    context: AdapterContext,
}

impl DocsumCompletionHandler {
    pub fn new(handle: ReturnHandle, context: AdapterContext) -> Self {
        Self { handle, context }
    }
}

impl DocsumClient for DocsumCompletionHandler {
    fn get_docsums_done(self: Box<Self>, reply: DocsumReply) {
        let Self { handle, context } = *self;
        let msg = converter::docsum_reply_to_proto(&reply);
        context.return_reply(&msg, handle);
    }
}

pub struct PingCompletionHandler {
    handle: ReturnHandle,
    context: AdapterContext,
}

impl PingCompletionHandler {
    pub fn new(handle: ReturnHandle, context: AdapterContext) -> Self {
        Self { handle, context }
    }
}

impl MonitorClient for PingCompletionHandler {
    fn ping_done(self: Box<Self>, reply: MonitorReply) {
        let Self { handle, context } = *self;
        let msg = converter::monitor_reply_to_proto(&reply);
        context.return_reply(&msg, handle);
    }
}
