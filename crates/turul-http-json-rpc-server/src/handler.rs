//! HTTP request handler for JSON-RPC calls

use std::sync::Arc;

use bytes::Bytes;
use http_body::Body;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::header::{CONTENT_TYPE, HeaderValue};
use hyper::{Method, Request, Response, StatusCode};
use tracing::debug;

use turul_json_rpc_server::{
    JsonRpcService, RequestContext, RpcReply, TransportError, check_http_method,
};

use crate::{CorsLayer, ServerConfig};

/// Boxed error type produced by bounded body reads
type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Turns one HTTP request into one JSON-RPC reply.
///
/// Verb, content type and body size are checked before the body reaches the
/// dispatcher; every outcome, including transport failures, is answered with
/// `Content-Type: application/json`.
#[derive(Clone)]
pub struct JsonRpcHttpHandler {
    config: Arc<ServerConfig>,
    service: Arc<JsonRpcService>,
}

impl JsonRpcHttpHandler {
    /// Create a new handler
    pub fn new(config: Arc<ServerConfig>, service: Arc<JsonRpcService>) -> Self {
        Self { config, service }
    }

    pub fn service(&self) -> &JsonRpcService {
        &self.service
    }

    /// Handle a JSON-RPC call over HTTP.
    ///
    /// With CORS enabled an `OPTIONS` preflight is answered directly; every
    /// other verb besides `POST` is a transport failure.
    pub async fn handle_request<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<BoxError>,
    {
        if self.config.enable_cors && *req.method() == Method::OPTIONS {
            return self.handle_preflight();
        }

        let reply = RpcReply::from_outcome(self.serve(req).await);
        self.into_response(reply)
    }

    async fn serve<B>(&self, req: Request<B>) -> Result<Bytes, TransportError>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<BoxError>,
    {
        let (parts, body) = req.into_parts();
        check_http_method(&parts.method)?;

        let content_type = parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok());
        if !self.config.content_types.accepts(content_type) {
            return Err(TransportError::UnsupportedContentType(
                content_type.unwrap_or_default().to_string(),
            ));
        }

        let body = read_body(body, self.config.max_body_size).await?;
        debug!("Received JSON-RPC call: {} bytes", body.len());

        self.service
            .handle_body(RequestContext::from_parts(parts), &body)
            .await
    }

    /// Answer a CORS preflight
    fn handle_preflight(&self) -> Response<Full<Bytes>> {
        debug!("Answering CORS preflight");
        let mut response = Response::new(Full::new(Bytes::new()));
        *response.status_mut() = StatusCode::NO_CONTENT;
        CorsLayer::apply_cors_headers(response.headers_mut());
        response
    }

    fn into_response(&self, reply: RpcReply) -> Response<Full<Bytes>> {
        let mut response = Response::new(Full::new(reply.body));
        *response.status_mut() = reply.status;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if self.config.enable_cors {
            CorsLayer::apply_cors_headers(response.headers_mut());
        }
        response
    }
}

/// Collect the body, refusing anything past `limit` bytes
async fn read_body<B>(body: B, limit: usize) -> Result<Bytes, TransportError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(err) if err.downcast_ref::<LengthLimitError>().is_some() => {
            Err(TransportError::PayloadTooLarge { limit })
        }
        Err(err) => Err(TransportError::Body(err.to_string())),
    }
}
