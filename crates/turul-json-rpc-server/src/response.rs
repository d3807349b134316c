use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{JsonRpcErrorObject, ToJsonRpcError};
use crate::types::{JsonRpcVersion, RequestId};

/// Exactly one of `result` or `error`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseOutcome {
    Result(Value),
    Error(JsonRpcErrorObject),
}

/// A JSON-RPC response envelope.
///
/// `id` mirrors the request it answers and is omitted when the request had
/// none, which is also how top-level transport errors are rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(
        default,
        deserialize_with = "crate::types::deserialize_present_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RequestId>,
    #[serde(rename = "jsonrpc")]
    pub version: JsonRpcVersion,
    #[serde(flatten)]
    pub outcome: ResponseOutcome,
}

impl JsonRpcResponse {
    pub fn new(id: Option<RequestId>, outcome: ResponseOutcome) -> Self {
        Self {
            id,
            version: JsonRpcVersion::V2_0,
            outcome,
        }
    }

    pub fn success(id: Option<RequestId>, result: Value) -> Self {
        Self::new(id, ResponseOutcome::Result(result))
    }

    pub fn error(id: Option<RequestId>, error: JsonRpcErrorObject) -> Self {
        Self::new(id, ResponseOutcome::Error(error))
    }

    /// Top-level envelope for a failure that aborted the whole call
    pub fn from_transport_error<E: ToJsonRpcError>(error: &E) -> Self {
        Self::error(None, error.to_error_object())
    }

    /// Check if this is an error response
    pub fn is_error(&self) -> bool {
        matches!(self.outcome, ResponseOutcome::Error(_))
    }

    pub fn result(&self) -> Option<&Value> {
        match &self.outcome {
            ResponseOutcome::Result(value) => Some(value),
            ResponseOutcome::Error(_) => None,
        }
    }

    pub fn error_object(&self) -> Option<&JsonRpcErrorObject> {
        match &self.outcome {
            ResponseOutcome::Error(error) => Some(error),
            ResponseOutcome::Result(_) => None,
        }
    }
}
