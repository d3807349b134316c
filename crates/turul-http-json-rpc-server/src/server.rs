//! HTTP JSON-RPC server
//!
//! Accepts connections on a TCP listener, routes the configured RPC path to
//! [`JsonRpcHttpHandler`] and answers every other path with 404.

use bytes::Bytes;
use http_body::Body;
use http_body_util::Full;
use hyper::header::{CONTENT_TYPE, HeaderValue};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use turul_json_rpc_server::{JsonRpcService, MethodDescriptor, MethodRegistry};

use crate::{CorsLayer, JsonRpcHttpHandler, Result};

/// Media types accepted as JSON-RPC call bodies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentTypePolicy {
    /// Accepted media types, compared case-insensitively without parameters
    pub accepted: Vec<String>,
    /// Reject calls whose `Content-Type` is missing or not accepted
    pub enforce: bool,
}

impl Default for ContentTypePolicy {
    fn default() -> Self {
        Self {
            accepted: vec!["application/json".to_string(), "text/json".to_string()],
            enforce: false,
        }
    }
}

impl ContentTypePolicy {
    /// Enforcing policy over the given media types
    pub fn enforced<I, S>(accepted: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            accepted: accepted.into_iter().map(Into::into).collect(),
            enforce: true,
        }
    }

    /// Whether a call carrying `content_type` may proceed
    pub fn accepts(&self, content_type: Option<&str>) -> bool {
        if !self.enforce {
            return true;
        }
        let Some(content_type) = content_type else {
            return false;
        };
        let media_type = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim();
        self.accepted
            .iter()
            .any(|accepted| accepted.eq_ignore_ascii_case(media_type))
    }
}

/// Configuration for the HTTP JSON-RPC server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_address: SocketAddr,
    /// Path for the JSON-RPC endpoint
    pub rpc_path: String,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum request body size
    pub max_body_size: usize,
    /// Content-Type handling for call bodies
    pub content_types: ContentTypePolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 8000)),
            rpc_path: "/rpc".to_string(),
            enable_cors: false,
            max_body_size: 1024 * 1024, // 1MB
            content_types: ContentTypePolicy::default(),
        }
    }
}

/// Builder for the HTTP JSON-RPC server
pub struct HttpJsonRpcServerBuilder {
    config: ServerConfig,
    registry: MethodRegistry,
}

impl HttpJsonRpcServerBuilder {
    /// Create a new builder with default configuration and no methods
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            registry: MethodRegistry::new(),
        }
    }

    /// Set the bind address
    pub fn bind_address(mut self, addr: SocketAddr) -> Self {
        self.config.bind_address = addr;
        self
    }

    /// Set the JSON-RPC endpoint path
    pub fn rpc_path(mut self, path: impl Into<String>) -> Self {
        self.config.rpc_path = path.into();
        self
    }

    /// Enable or disable CORS
    pub fn cors(mut self, enable: bool) -> Self {
        self.config.enable_cors = enable;
        self
    }

    /// Set maximum request body size
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.config.max_body_size = size;
        self
    }

    /// Replace the Content-Type policy
    pub fn content_types(mut self, policy: ContentTypePolicy) -> Self {
        self.config.content_types = policy;
        self
    }

    /// Turn Content-Type enforcement on or off, keeping the accepted list
    pub fn enforce_content_type(mut self, enforce: bool) -> Self {
        self.config.content_types.enforce = enforce;
        self
    }

    /// Register a method; a name already taken is refused
    pub fn register_method<D>(mut self, name: impl Into<String>, method: D) -> Result<Self>
    where
        D: MethodDescriptor + 'static,
    {
        self.registry.register(name, method)?;
        Ok(self)
    }

    /// Serve an already populated registry, replacing any methods registered so far
    pub fn registry(mut self, registry: MethodRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Build the HTTP JSON-RPC server
    pub fn build(self) -> HttpJsonRpcServer {
        let config = Arc::new(self.config);
        let service = Arc::new(JsonRpcService::new(self.registry));
        HttpJsonRpcServer {
            handler: JsonRpcHttpHandler::new(Arc::clone(&config), service),
            config,
        }
    }
}

impl Default for HttpJsonRpcServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// HTTP JSON-RPC server
#[derive(Clone)]
pub struct HttpJsonRpcServer {
    config: Arc<ServerConfig>,
    handler: JsonRpcHttpHandler,
}

impl HttpJsonRpcServer {
    /// Create a new builder
    pub fn builder() -> HttpJsonRpcServerBuilder {
        HttpJsonRpcServerBuilder::new()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn handler(&self) -> &JsonRpcHttpHandler {
        &self.handler
    }

    /// Bind the configured address and serve until the listener fails
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_address).await?;
        self.serve(listener).await
    }

    /// Serve connections from an already bound listener
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        info!("HTTP JSON-RPC server listening on {}", listener.local_addr()?);
        info!("JSON-RPC endpoint available at: {}", self.config.rpc_path);
        info!(
            "Registered methods: {:?}",
            self.handler.service().registry().method_names()
        );

        loop {
            let (stream, peer_addr) = listener.accept().await?;
            debug!("New connection from {}", peer_addr);

            let server = self.clone();
            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                let service = service_fn(move |mut req: Request<hyper::body::Incoming>| {
                    let server = server.clone();
                    async move {
                        req.extensions_mut().insert(peer_addr);
                        Ok::<_, Infallible>(server.route(req).await)
                    }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    if err.is_incomplete_message() {
                        debug!("Client disconnected (normal): {}", err);
                    } else {
                        error!("Error serving connection: {}", err);
                    }
                }
            });
        }
    }

    /// Route one request by path
    pub async fn route<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        debug!("Handling {} {}", req.method(), req.uri().path());

        if req.uri().path() == self.config.rpc_path {
            return self.handler.handle_request(req).await;
        }

        let mut response = Response::new(Full::new(Bytes::from("Not Found")));
        *response.status_mut() = StatusCode::NOT_FOUND;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        if self.config.enable_cors {
            CorsLayer::apply_cors_headers(response.headers_mut());
        }
        response
    }
}
