//! One-call pipeline: parse, dispatch, assemble.

use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use tracing::warn;

use crate::assemble::{assemble_response, assemble_transport_error};
use crate::dispatch::JsonRpcDispatcher;
use crate::error::TransportError;
use crate::parse::{check_http_method, parse_request_body};
use crate::registry::MethodRegistry;
use crate::request::RequestContext;

/// Status and encoded body for one HTTP call
#[derive(Debug, Clone, PartialEq)]
pub struct RpcReply {
    pub status: StatusCode,
    pub body: Bytes,
}

impl RpcReply {
    /// Render a finished call; transport failures become a top-level error
    /// envelope with their own status
    pub fn from_outcome(outcome: Result<Bytes, TransportError>) -> Self {
        match outcome {
            Ok(body) => Self {
                status: StatusCode::OK,
                body,
            },
            Err(err) => {
                warn!("JSON-RPC call rejected: {}", err);
                Self {
                    status: err.status_code(),
                    body: assemble_transport_error(&err),
                }
            }
        }
    }
}

/// Owns the method registry and serves whole JSON-RPC calls.
///
/// The registry is moved in at construction, so registration is finished
/// before the first call is served.
#[derive(Debug, Clone)]
pub struct JsonRpcService {
    dispatcher: JsonRpcDispatcher,
}

impl JsonRpcService {
    pub fn new(registry: MethodRegistry) -> Self {
        Self {
            dispatcher: JsonRpcDispatcher::new(Arc::new(registry)),
        }
    }

    pub fn registry(&self) -> &MethodRegistry {
        self.dispatcher.registry()
    }

    /// Serve a call whose HTTP verb has already been accepted
    pub async fn handle_body(
        &self,
        context: RequestContext,
        body: &[u8],
    ) -> Result<Bytes, TransportError> {
        let parsed = parse_request_body(body)?;
        let responses = self
            .dispatcher
            .dispatch_all(Arc::new(context), parsed.requests)
            .await?;
        assemble_response(parsed.shape, &responses)
    }

    /// Serve a complete call, verb check included
    pub async fn handle(&self, context: RequestContext, body: &[u8]) -> RpcReply {
        let outcome = match check_http_method(context.method()) {
            Ok(()) => self.handle_body(context, body).await,
            Err(err) => Err(err),
        };
        RpcReply::from_outcome(outcome)
    }
}
