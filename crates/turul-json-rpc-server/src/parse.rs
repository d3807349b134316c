//! Request body classification: batch array or single envelope.

use http::Method;
use tracing::debug;

use crate::error::TransportError;
use crate::request::JsonRpcRequest;

/// Shape of the incoming call, mirrored by the response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestShape {
    /// A bare request object
    Single,
    /// An array of request objects, possibly empty
    Batch,
}

/// Envelopes in input order plus the shape they arrived in
#[derive(Debug, Clone)]
pub struct ParsedRequests {
    pub requests: Vec<JsonRpcRequest>,
    pub shape: RequestShape,
}

impl ParsedRequests {
    pub fn is_single(&self) -> bool {
        self.shape == RequestShape::Single
    }
}

/// Only `POST` carries JSON-RPC calls
pub fn check_http_method(method: &Method) -> Result<(), TransportError> {
    if *method == Method::POST {
        Ok(())
    } else {
        Err(TransportError::InvalidHttpMethod(method.clone()))
    }
}

/// Decode a request body.
///
/// The array form is tried first and its error is the one reported when
/// neither form decodes, even though the single-object attempt runs last.
pub fn parse_request_body(body: &[u8]) -> Result<ParsedRequests, TransportError> {
    let batch_error = match serde_json::from_slice::<Vec<JsonRpcRequest>>(body) {
        Ok(requests) => {
            debug!("Parsed JSON-RPC batch of {} request(s)", requests.len());
            return Ok(ParsedRequests {
                requests,
                shape: RequestShape::Batch,
            });
        }
        Err(err) => err,
    };

    match serde_json::from_slice::<JsonRpcRequest>(body) {
        Ok(request) => Ok(ParsedRequests {
            requests: vec![request],
            shape: RequestShape::Single,
        }),
        Err(single_error) => {
            debug!("Single-object decode also failed: {}", single_error);
            Err(TransportError::Parse(batch_error))
        }
    }
}
