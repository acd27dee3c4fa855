//! Method registry and in-process dispatch.

use crate::error::ProtocolError;
use crate::rpc::call::{InboundCall, PendingReply, RpcErrorCode, RpcRequest};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Handler invoked for every call to a registered method.
pub type MethodHandler = Arc<dyn Fn(InboundCall) + Send + Sync>;

/// Signature and documentation of an RPC method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSpec {
    name: String,
    param_types: String,
    return_types: String,
    description: String,
    params: Vec<(String, String)>,
    returns: Vec<(String, String)>,
}

impl MethodSpec {
    pub fn new(
        name: impl Into<String>,
        param_types: impl Into<String>,
        return_types: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            param_types: param_types.into(),
            return_types: return_types.into(),
            description: String::new(),
            params: Vec::new(),
            returns: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Documents the next parameter.
    pub fn param(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.params.push((name.into(), description.into()));
        self
    }

    /// Documents the next return value.
    pub fn returns(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.returns.push((name.into(), description.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn param_types(&self) -> &str {
        &self.param_types
    }

    pub fn return_types(&self) -> &str {
        &self.return_types
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn param_docs(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn return_docs(&self) -> &[(String, String)] {
        &self.returns
    }
}

struct RegisteredMethod {
    spec: MethodSpec,
    handler: MethodHandler,
}

/// Registry of RPC methods.
///
/// Handlers run on the thread that calls [`invoke`](Self::invoke); a handler
/// that detaches its call may finish it later from anywhere.
#[derive(Default)]
pub struct Supervisor {
    methods: RwLock<HashMap<String, RegisteredMethod>>,
}

impl Supervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a method. Fails if the name is already taken.
    pub fn define_method(
        &self,
        spec: MethodSpec,
        handler: MethodHandler,
    ) -> Result<(), ProtocolError> {
        let mut methods = self.methods.write();
        if methods.contains_key(spec.name()) {
            return Err(ProtocolError::MethodExists(spec.name().to_string()));
        }
        tracing::debug!(
            "Registered method {} ({}) -> ({})",
            spec.name(),
            spec.param_types(),
            spec.return_types()
        );
        methods.insert(spec.name().to_string(), RegisteredMethod { spec, handler });
        Ok(())
    }

    /// Returns the signature of a registered method.
    pub fn method(&self, name: &str) -> Option<MethodSpec> {
        self.methods.read().get(name).map(|m| m.spec.clone())
    }

    /// Returns the names of all registered methods, sorted.
    pub fn method_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.methods.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Dispatches a call.
    ///
    /// Unknown methods and parameter lists that do not match the registered
    /// signature are answered with an error without reaching the handler.
    pub fn invoke(&self, request: RpcRequest) -> PendingReply {
        let target = self.methods.read().get(request.method_name()).map(|m| {
            (
                m.spec.param_types().to_string(),
                Arc::clone(&m.handler),
            )
        });

        let (call, pending) = InboundCall::new(request);
        match target {
            None => {
                let name = call.method_name().to_string();
                tracing::debug!("No such method: {}", name);
                let (_, handle) = call.detach();
                handle.fail(RpcErrorCode::NoSuchMethod, format!("no such method: {}", name));
            }
            Some((param_types, _)) if !call.params().matches(&param_types) => {
                let message = format!(
                    "wrong parameters for {}: expected ({}), got {}",
                    call.method_name(),
                    param_types,
                    call.params()
                );
                let (_, handle) = call.detach();
                handle.fail(RpcErrorCode::WrongParams, message);
            }
            Some((_, handler)) => handler(call),
        }
        pending
    }
}

impl fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Supervisor")
            .field("methods", &self.method_names())
            .finish()
    }
}
