//! # HTTP JSON-RPC Server Prelude
//!
//! This module provides convenient re-exports of the most commonly used types
//! from the HTTP JSON-RPC server library.
//!
//! ```rust
//! use turul_http_json_rpc_server::prelude::*;
//! ```

// Core server types
pub use crate::cors::CorsLayer;
pub use crate::handler::JsonRpcHttpHandler;
pub use crate::server::{
    ContentTypePolicy, HttpJsonRpcServer, HttpJsonRpcServerBuilder, ServerConfig,
};

// Re-export foundational types
pub use turul_json_rpc_server::prelude::*;

// Error types
pub use crate::{HttpJsonRpcError, Result};
