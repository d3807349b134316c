//! # JSON-RPC 2.0 Dispatcher
//!
//! A transport-agnostic JSON-RPC 2.0 dispatcher. A call body holding either one
//! request object or an array of them is parsed, every request is run on its
//! own task against a registry of typed methods, and the responses are encoded
//! back in the same shape and order.
//!
//! ## Features
//! - Single and batch calls, response shape mirrors the request
//! - Typed parameters decoded and validated per invocation
//! - Concurrent execution with per-request failure isolation
//! - Two error tiers: whole-call transport failures and per-request errors

pub mod assemble;
pub mod dispatch;
pub mod error;
pub mod parse;
pub mod prelude;
pub mod registry;
pub mod request;
pub mod response;
pub mod service;
pub mod types;

// Re-export main types
pub use assemble::{assemble_response, assemble_transport_error};
pub use dispatch::JsonRpcDispatcher;
pub use error::{
    DispatchError, JsonRpcErrorCode, JsonRpcErrorObject, RegistryError, ToJsonRpcError,
    TransportError, ValidationError,
};
pub use parse::{ParsedRequests, RequestShape, check_http_method, parse_request_body};
pub use registry::{
    FunctionMethod, JsonRpcMethod, MethodDescriptor, MethodRegistry, RpcParams, method_fn,
};
pub use request::{JsonRpcRequest, RequestContext};
pub use response::{JsonRpcResponse, ResponseOutcome};
pub use service::{JsonRpcService, RpcReply};
pub use types::{JsonRpcVersion, RequestId};

/// JSON-RPC 2.0 version constant
pub const JSONRPC_VERSION: &str = "2.0";

/// Standard JSON-RPC 2.0 error codes
pub mod error_codes {
    pub const PARSE_ERROR: i64 = -32700;
    /// Defined by the protocol; structurally invalid envelopes are reported as
    /// method-not-found instead
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;
}
