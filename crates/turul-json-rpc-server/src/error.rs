use std::fmt;

use http::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JSON-RPC error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonRpcErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
}

impl JsonRpcErrorCode {
    pub fn code(&self) -> i64 {
        match self {
            JsonRpcErrorCode::ParseError => crate::error_codes::PARSE_ERROR,
            JsonRpcErrorCode::InvalidRequest => crate::error_codes::INVALID_REQUEST,
            JsonRpcErrorCode::MethodNotFound => crate::error_codes::METHOD_NOT_FOUND,
            JsonRpcErrorCode::InvalidParams => crate::error_codes::INVALID_PARAMS,
            JsonRpcErrorCode::InternalError => crate::error_codes::INTERNAL_ERROR,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            JsonRpcErrorCode::ParseError => "Parse error",
            JsonRpcErrorCode::InvalidRequest => "Invalid Request",
            JsonRpcErrorCode::MethodNotFound => "Method not found",
            JsonRpcErrorCode::InvalidParams => "Invalid params",
            JsonRpcErrorCode::InternalError => "Internal error",
        }
    }
}

impl fmt::Display for JsonRpcErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

/// JSON-RPC Error object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl JsonRpcErrorObject {
    pub fn new(code: JsonRpcErrorCode, message: Option<String>, data: Option<String>) -> Self {
        Self {
            code: code.code(),
            message: message.unwrap_or_else(|| code.message().to_string()),
            data,
        }
    }

    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(JsonRpcErrorCode::ParseError, Some(message.into()), None)
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            JsonRpcErrorCode::MethodNotFound,
            Some(format!("method `{}` does not exist", method)),
            None,
        )
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(JsonRpcErrorCode::InvalidParams, Some(message.into()), None)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(JsonRpcErrorCode::InternalError, Some(message.into()), None)
    }

    /// Attach auxiliary text to the error
    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }
}

/// Trait for errors that can be converted to JSON-RPC error objects
pub trait ToJsonRpcError: std::error::Error + Send + Sync + 'static {
    /// Convert this error to a JSON-RPC error object
    fn to_error_object(&self) -> JsonRpcErrorObject;
}

/// Parameter validation failure reported by [`crate::RpcParams::validate`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Registration-time failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("method name `{0}` has already been registered")]
    DuplicateMethod(String),
}

/// Failures isolated to a single request envelope.
///
/// Each variant only ever affects its own response slot; siblings in the same
/// batch run to completion regardless.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("method `{0}` does not exist")]
    MethodNotFound(String),

    /// Params payload could not be decoded into the method's parameter type
    #[error("{0}")]
    InvalidParams(#[source] serde_json::Error),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The action itself failed; the message is the action error's text
    #[error("{0}")]
    Action(String),

    #[error("method `{method}` panicked: {message}")]
    Panicked { method: String, message: String },

    /// The action's output could not be encoded as a JSON value.
    ///
    /// The dispatcher escalates this to [`TransportError::Serialization`].
    #[error("{0}")]
    ResultEncoding(#[source] serde_json::Error),
}

impl ToJsonRpcError for DispatchError {
    fn to_error_object(&self) -> JsonRpcErrorObject {
        match self {
            DispatchError::MethodNotFound(method) => JsonRpcErrorObject::method_not_found(method),
            DispatchError::InvalidParams(_) | DispatchError::Validation(_) => {
                JsonRpcErrorObject::invalid_params(self.to_string())
            }
            DispatchError::Action(_)
            | DispatchError::Panicked { .. }
            | DispatchError::ResultEncoding(_) => {
                JsonRpcErrorObject::internal_error(self.to_string())
            }
        }
    }
}

/// Failures that abort the whole HTTP call.
///
/// Rendered as a single top-level error envelope without an `id`.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid HTTP method")]
    InvalidHttpMethod(Method),

    /// Neither the batch nor the single-object decoding succeeded; carries the
    /// batch attempt's error
    #[error("{0}")]
    Parse(#[source] serde_json::Error),

    #[error("{0}")]
    Body(String),

    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("unsupported content type `{0}`")]
    UnsupportedContentType(String),

    #[error("{0}")]
    Serialization(#[source] serde_json::Error),
}

impl TransportError {
    /// HTTP status that accompanies this failure
    pub fn status_code(&self) -> StatusCode {
        match self {
            TransportError::InvalidHttpMethod(_)
            | TransportError::Parse(_)
            | TransportError::Body(_) => StatusCode::BAD_REQUEST,
            TransportError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            TransportError::UnsupportedContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            TransportError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ToJsonRpcError for TransportError {
    fn to_error_object(&self) -> JsonRpcErrorObject {
        match self {
            TransportError::Serialization(_) => {
                JsonRpcErrorObject::internal_error(self.to_string())
            }
            _ => JsonRpcErrorObject::parse_error(self.to_string()),
        }
    }
}
