//! # JSON-RPC Server Prelude
//!
//! This module provides convenient re-exports of the most commonly used types
//! from the JSON-RPC server library.
//!
//! ```rust
//! use turul_json_rpc_server::prelude::*;
//! ```

// Core JSON-RPC types
pub use crate::error::{JsonRpcErrorObject, RegistryError, ToJsonRpcError, ValidationError};
pub use crate::registry::{JsonRpcMethod, MethodRegistry, RpcParams, method_fn};
pub use crate::request::{JsonRpcRequest, RequestContext};
pub use crate::response::{JsonRpcResponse, ResponseOutcome};
pub use crate::service::{JsonRpcService, RpcReply};
pub use crate::types::{JsonRpcVersion, RequestId};

// Standard error codes
pub use crate::error_codes::*;
