//! In-process RPC layer: typed values, call objects and method dispatch.

pub mod call;
pub mod supervisor;
pub mod values;

pub use call::{
    CompletedCall, InboundCall, PendingReply, ReturnHandle, RpcError, RpcErrorCode, RpcRequest,
};
pub use supervisor::{MethodHandler, MethodSpec, Supervisor};
pub use values::{Value, Values};
