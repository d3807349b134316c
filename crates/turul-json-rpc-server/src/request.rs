use std::net::SocketAddr;

use http::{HeaderMap, Method, Uri, request::Parts};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{RequestId, deserialize_present_id};

/// A JSON-RPC request envelope as received on the wire.
///
/// Only `method` drives dispatch. `jsonrpc` is carried but not checked, and a
/// missing `method` decodes as the empty name so it surfaces as "method not
/// found" rather than as a distinct invalid-request error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(
        default,
        deserialize_with = "deserialize_present_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RequestId>,
    #[serde(rename = "jsonrpc", default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn new(id: Option<RequestId>, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            id,
            version: Some(crate::JSONRPC_VERSION.to_string()),
            method: method.into(),
            params,
        }
    }

    /// Create a new request with parameters
    pub fn with_params(id: RequestId, method: impl Into<String>, params: Value) -> Self {
        Self::new(Some(id), method, Some(params))
    }
}

/// The inbound transport request handed to every method action.
///
/// Built once per HTTP call and shared read-only by all tasks of a batch.
#[derive(Debug)]
pub struct RequestContext {
    parts: Parts,
}

impl RequestContext {
    pub fn from_parts(parts: Parts) -> Self {
        Self { parts }
    }

    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    /// Header value as a string, if present and valid UTF-8
    pub fn header(&self, name: &str) -> Option<&str> {
        self.parts.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn extensions(&self) -> &http::Extensions {
        &self.parts.extensions
    }

    /// Peer address, when the listener recorded one in the request extensions
    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.parts.extensions.get::<SocketAddr>().copied()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        let (parts, ()) = http::Request::new(()).into_parts();
        Self::from_parts(parts)
    }
}
