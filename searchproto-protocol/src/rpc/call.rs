//! RPC call objects.
//!
//! A call is created by the caller as an [`RpcRequest`]. The transport turns
//! it into an [`InboundCall`] for the method handler and a [`PendingReply`]
//! for the caller. The handler detaches the call into its parameters and a
//! [`ReturnHandle`]; the handle is `Send` and may be finished from any
//! thread, exactly once. A handle dropped without being finished returns an
//! abort error so the caller is never left waiting.

use crate::rpc::values::Values;
use std::fmt;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

/// Transport-level error codes.
///
/// These values are part of the RPC contract and must remain stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum RpcErrorCode {
    GeneralError = 100,
    NotImplemented = 101,
    Abort = 102,
    Timeout = 103,
    Connection = 104,
    BadRequest = 105,
    NoSuchMethod = 106,
    WrongParams = 107,
    Overload = 108,
    WrongReturn = 109,
    BadReply = 110,
    MethodFailed = 111,
    PermissionDenied = 112,
}

impl RpcErrorCode {
    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn from_code(code: u32) -> Option<Self> {
        let kind = match code {
            100 => RpcErrorCode::GeneralError,
            101 => RpcErrorCode::NotImplemented,
            102 => RpcErrorCode::Abort,
            103 => RpcErrorCode::Timeout,
            104 => RpcErrorCode::Connection,
            105 => RpcErrorCode::BadRequest,
            106 => RpcErrorCode::NoSuchMethod,
            107 => RpcErrorCode::WrongParams,
            108 => RpcErrorCode::Overload,
            109 => RpcErrorCode::WrongReturn,
            110 => RpcErrorCode::BadReply,
            111 => RpcErrorCode::MethodFailed,
            112 => RpcErrorCode::PermissionDenied,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for RpcErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RpcErrorCode::GeneralError => "GENERAL_ERROR",
            RpcErrorCode::NotImplemented => "NOT_IMPLEMENTED",
            RpcErrorCode::Abort => "ABORT",
            RpcErrorCode::Timeout => "TIMEOUT",
            RpcErrorCode::Connection => "CONNECTION",
            RpcErrorCode::BadRequest => "BAD_REQUEST",
            RpcErrorCode::NoSuchMethod => "NO_SUCH_METHOD",
            RpcErrorCode::WrongParams => "WRONG_PARAMS",
            RpcErrorCode::Overload => "OVERLOAD",
            RpcErrorCode::WrongReturn => "WRONG_RETURN",
            RpcErrorCode::BadReply => "BAD_REPLY",
            RpcErrorCode::MethodFailed => "METHOD_FAILED",
            RpcErrorCode::PermissionDenied => "PERMISSION_DENIED",
        };
        write!(f, "{}", name)
    }
}

/// Call-level error set instead of return values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcError {
    pub code: u32,
    pub message: String,
}

impl RpcError {
    pub fn new(code: RpcErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            message: message.into(),
        }
    }

    /// Returns the well-known code, if this is one.
    pub fn kind(&self) -> Option<RpcErrorCode> {
        RpcErrorCode::from_code(self.code)
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            Some(kind) => write!(f, "{} ({}): {}", kind, self.code, self.message),
            None => write!(f, "{}: {}", self.code, self.message),
        }
    }
}

/// An outbound call: target method and parameters.
#[derive(Debug, Clone, Default)]
pub struct RpcRequest {
    method_name: String,
    params: Values,
}

impl RpcRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_method(method_name: impl Into<String>, params: Values) -> Self {
        Self {
            method_name: method_name.into(),
            params,
        }
    }

    pub fn set_method_name(&mut self, method_name: impl Into<String>) {
        self.method_name = method_name.into();
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    pub fn params(&self) -> &Values {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut Values {
        &mut self.params
    }
}

/// A finished call as seen by the caller.
#[derive(Debug, Clone)]
pub struct CompletedCall {
    method_name: String,
    return_values: Values,
    error: Option<RpcError>,
}

impl CompletedCall {
    pub fn new(method_name: impl Into<String>, return_values: Values, error: Option<RpcError>) -> Self {
        Self {
            method_name: method_name.into(),
            return_values,
            error,
        }
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    pub fn return_values(&self) -> &Values {
        &self.return_values
    }

    pub fn error(&self) -> Option<&RpcError> {
        self.error.as_ref()
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Returns whether the call succeeded with exactly the given return types.
    pub fn check_return_types(&self, types: &str) -> bool {
        self.error.is_none() && self.return_values.matches(types)
    }
}

/// A call delivered to a method handler.
pub struct InboundCall {
    method_name: String,
    params: Values,
    handle: ReturnHandle,
}

impl InboundCall {
    /// Creates a call from a request, returning the caller's side as well.
    pub fn new(request: RpcRequest) -> (Self, PendingReply) {
        let (tx, rx) = oneshot::channel();
        let call = Self {
            method_name: request.method_name.clone(),
            params: request.params,
            handle: ReturnHandle {
                method_name: request.method_name.clone(),
                sender: Some(tx),
            },
        };
        let pending = PendingReply {
            method_name: request.method_name,
            rx,
        };
        (call, pending)
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    pub fn params(&self) -> &Values {
        &self.params
    }

    /// Detaches the call from the invoking thread.
    ///
    /// The parameters and the return path are handed out separately; the
    /// call finishes when the returned handle is used or dropped.
    pub fn detach(self) -> (Values, ReturnHandle) {
        (self.params, self.handle)
    }
}

impl fmt::Debug for InboundCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InboundCall")
            .field("method_name", &self.method_name)
            .field("params", &self.params.type_string())
            .finish()
    }
}

/// Single-use return path of a detached call.
pub struct ReturnHandle {
    method_name: String,
    sender: Option<oneshot::Sender<CompletedCall>>,
}

impl ReturnHandle {
    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// Finishes the call with the given return values.
    pub fn return_values(mut self, values: Values) {
        self.finish(values, None);
    }

    /// Finishes the call with a call-level error and no return values.
    pub fn fail(mut self, code: RpcErrorCode, message: impl Into<String>) {
        self.finish(Values::new(), Some(RpcError::new(code, message)));
    }

    fn finish(&mut self, return_values: Values, error: Option<RpcError>) {
        if let Some(tx) = self.sender.take() {
            let completed = CompletedCall {
                method_name: self.method_name.clone(),
                return_values,
                error,
            };
            if tx.send(completed).is_err() {
                tracing::debug!("Caller of {} went away before the reply", self.method_name);
            }
        }
    }
}

impl Drop for ReturnHandle {
    fn drop(&mut self) {
        if self.sender.is_some() {
            tracing::warn!("Call to {} dropped without reply", self.method_name);
            self.finish(
                Values::new(),
                Some(RpcError::new(RpcErrorCode::Abort, "call dropped without reply")),
            );
        }
    }
}

impl fmt::Debug for ReturnHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReturnHandle")
            .field("method_name", &self.method_name)
            .field("finished", &self.sender.is_none())
            .finish()
    }
}

/// Caller's view of a call that has not finished yet.
#[derive(Debug)]
pub struct PendingReply {
    method_name: String,
    rx: oneshot::Receiver<CompletedCall>,
}

impl PendingReply {
    /// Waits for the call to finish.
    pub async fn wait(self) -> CompletedCall {
        let method_name = self.method_name;
        match self.rx.await {
            Ok(completed) => completed,
            Err(_) => lost(method_name),
        }
    }

    /// Blocks the current thread until the call finishes.
    ///
    /// Must not be called from within an async runtime.
    pub fn blocking_wait(self) -> CompletedCall {
        let method_name = self.method_name;
        match self.rx.blocking_recv() {
            Ok(completed) => completed,
            Err(_) => lost(method_name),
        }
    }

    /// Returns the finished call if it is available, without waiting.
    ///
    /// Yields a value at most once.
    pub fn try_take(&mut self) -> Option<CompletedCall> {
        match self.rx.try_recv() {
            Ok(completed) => Some(completed),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(lost(self.method_name.clone())),
        }
    }
}

fn lost(method_name: String) -> CompletedCall {
    CompletedCall {
        method_name,
        return_values: Values::new(),
        error: Some(RpcError::new(RpcErrorCode::Abort, "reply channel closed")),
    }
}
