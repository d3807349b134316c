//! # HTTP JSON-RPC Server
//!
//! HTTP transport for the turul JSON-RPC 2.0 dispatcher. Each POST to the
//! configured path carries one call: a single request object or a batch array.
//! The reply mirrors the call's shape; transport failures are answered with a
//! top-level JSON-RPC error object and a non-200 status.
//!
//! ## Features
//! - hyper 1 HTTP/1.1 server with one task per connection
//! - Body size limit and optional Content-Type enforcement
//! - CORS support for browser-based clients
//! - Peer address exposed to methods through the request context

pub mod cors;
pub mod handler;
pub mod prelude;
pub mod server;

#[cfg(test)]
mod tests;

// Re-export main types
pub use cors::CorsLayer;
pub use handler::JsonRpcHttpHandler;
pub use server::{ContentTypePolicy, HttpJsonRpcServer, HttpJsonRpcServerBuilder, ServerConfig};

// Re-export foundational types
pub use turul_json_rpc_server::*;

/// Result type for HTTP JSON-RPC operations
pub type Result<T> = std::result::Result<T, HttpJsonRpcError>;

/// HTTP JSON-RPC server errors
#[derive(Debug, thiserror::Error)]
pub enum HttpJsonRpcError {
    #[error("Method registration error: {0}")]
    Registry(#[from] turul_json_rpc_server::RegistryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
