//! Concurrent execution of parsed request envelopes.

use std::any::Any;
use std::sync::Arc;

use futures::future::join_all;
use serde_json::Value;
use tokio::task::JoinError;
use tracing::{debug, error, warn};

use crate::error::{DispatchError, ToJsonRpcError, TransportError};
use crate::registry::MethodRegistry;
use crate::request::{JsonRpcRequest, RequestContext};
use crate::response::JsonRpcResponse;
use crate::types::RequestId;

/// Position in the response list, fixed before its task is spawned
struct ResponseSlot {
    id: Option<RequestId>,
    method: String,
}

/// Runs each request envelope on its own task against a shared, read-only
/// registry
#[derive(Debug, Clone)]
pub struct JsonRpcDispatcher {
    registry: Arc<MethodRegistry>,
}

impl JsonRpcDispatcher {
    pub fn new(registry: Arc<MethodRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &MethodRegistry {
        &self.registry
    }

    /// Dispatch every request concurrently and return one response per
    /// request, in input order.
    ///
    /// All tasks are spawned before any is awaited and the call returns only
    /// once every task has finished. Failures stay in their own slot, except a
    /// result that cannot be encoded, which fails the whole call.
    pub async fn dispatch_all(
        &self,
        context: Arc<RequestContext>,
        requests: Vec<JsonRpcRequest>,
    ) -> Result<Vec<JsonRpcResponse>, TransportError> {
        let mut slots = Vec::with_capacity(requests.len());
        let mut tasks = Vec::with_capacity(requests.len());

        for request in requests {
            slots.push(ResponseSlot {
                id: request.id.clone(),
                method: request.method.clone(),
            });

            let registry = Arc::clone(&self.registry);
            let context = Arc::clone(&context);
            tasks.push(tokio::spawn(async move {
                execute(&registry, &context, request).await
            }));
        }

        let outcomes = join_all(tasks).await;

        slots
            .into_iter()
            .zip(outcomes)
            .map(|(slot, joined)| {
                let outcome = joined.unwrap_or_else(|err| {
                    Err(DispatchError::Panicked {
                        method: slot.method.clone(),
                        message: join_error_message(err),
                    })
                });
                into_response(slot, outcome)
            })
            .collect()
    }
}

/// Resolve, decode, validate and run a single request
async fn execute(
    registry: &MethodRegistry,
    context: &RequestContext,
    request: JsonRpcRequest,
) -> Result<Value, DispatchError> {
    let method = registry
        .lookup(&request.method)
        .ok_or_else(|| DispatchError::MethodNotFound(request.method.clone()))?;

    debug!("Dispatching JSON-RPC method: {}", request.method);
    method.invoke(context, request.params).await
}

fn into_response(
    slot: ResponseSlot,
    outcome: Result<Value, DispatchError>,
) -> Result<JsonRpcResponse, TransportError> {
    match outcome {
        Ok(result) => Ok(JsonRpcResponse::success(slot.id, result)),
        Err(DispatchError::ResultEncoding(err)) => {
            error!("Result of method `{}` could not be encoded: {}", slot.method, err);
            Err(TransportError::Serialization(err))
        }
        Err(err) => {
            warn!("JSON-RPC method `{}` failed: {}", slot.method, err);
            Ok(JsonRpcResponse::error(slot.id, err.to_error_object()))
        }
    }
}

fn join_error_message(err: JoinError) -> String {
    if !err.is_panic() {
        return err.to_string();
    }
    panic_payload_message(err.into_panic())
}

fn panic_payload_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
