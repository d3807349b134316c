//! Response body encoding that mirrors the request's shape.

use bytes::Bytes;

use crate::error::TransportError;
use crate::parse::RequestShape;
use crate::response::JsonRpcResponse;

/// Encode the ordered responses.
///
/// A single-shaped call with exactly one response is written as a bare
/// object; everything else, the empty batch included, as an array.
pub fn assemble_response(
    shape: RequestShape,
    responses: &[JsonRpcResponse],
) -> Result<Bytes, TransportError> {
    let encoded = match (shape, responses) {
        (RequestShape::Single, [response]) => serde_json::to_vec(response),
        _ => serde_json::to_vec(responses),
    };

    encoded
        .map(Bytes::from)
        .map_err(TransportError::Serialization)
}

/// Encode the top-level envelope for a failure that aborted the call
pub fn assemble_transport_error(error: &TransportError) -> Bytes {
    let envelope = JsonRpcResponse::from_transport_error(error);
    match serde_json::to_vec(&envelope) {
        Ok(body) => Bytes::from(body),
        Err(_) => Bytes::from_static(
            br#"{"jsonrpc":"2.0","error":{"code":-32603,"message":"Internal error"}}"#,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JsonRpcErrorObject;
    use crate::types::RequestId;
    use serde_json::json;

    fn ok(id: i64) -> JsonRpcResponse {
        JsonRpcResponse::success(Some(RequestId::from(id)), json!(id * 10))
    }

    #[test]
    fn test_single_shape_is_bare_object() {
        let body = assemble_response(RequestShape::Single, &[ok(1)]).unwrap();
        assert_eq!(&body[..], br#"{"id":1,"jsonrpc":"2.0","result":10}"#);
    }

    #[test]
    fn test_batch_shape_is_array_even_for_one() {
        let body = assemble_response(RequestShape::Batch, &[ok(1)]).unwrap();
        assert_eq!(&body[..], br#"[{"id":1,"jsonrpc":"2.0","result":10}]"#);
    }

    #[test]
    fn test_empty_batch_is_empty_array() {
        let body = assemble_response(RequestShape::Batch, &[]).unwrap();
        assert_eq!(&body[..], b"[]");
    }

    #[test]
    fn test_mixed_batch_keeps_order() {
        let responses = vec![
            ok(2),
            JsonRpcResponse::error(
                Some(RequestId::from(1)),
                JsonRpcErrorObject::method_not_found("Nope"),
            ),
        ];
        let body = assemble_response(RequestShape::Batch, &responses).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(value[0]["id"], json!(2));
        assert_eq!(value[0]["result"], json!(20));
        assert_eq!(value[1]["id"], json!(1));
        assert_eq!(value[1]["error"]["code"], json!(-32601));
        assert!(value[1].get("result").is_none());
    }

    #[test]
    fn test_transport_error_body() {
        let error = TransportError::Body("connection reset".to_string());
        let body = assemble_transport_error(&error);
        assert_eq!(
            &body[..],
            br#"{"jsonrpc":"2.0","error":{"code":-32700,"message":"connection reset"}}"#
        );
    }
}
