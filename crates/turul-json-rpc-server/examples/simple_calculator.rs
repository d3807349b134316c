//! Simple Calculator JSON-RPC Example
//!
//! Registers `add` and `subtract`, then pushes a few single and batch calls
//! through the service without any HTTP server involved.

use async_trait::async_trait;
use serde::Deserialize;
use turul_json_rpc_server::prelude::*;

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct CalculatorError(String);

#[derive(Deserialize)]
struct Operands {
    a: f64,
    b: f64,
}

impl RpcParams for Operands {
    fn validate(&self) -> Result<(), ValidationError> {
        if !self.a.is_finite() || !self.b.is_finite() {
            return Err(ValidationError::new("operands must be finite numbers"));
        }
        Ok(())
    }
}

struct Add;

#[async_trait]
impl JsonRpcMethod for Add {
    type Params = Operands;
    type Output = f64;
    type Error = CalculatorError;

    async fn call(
        &self,
        _request: &RequestContext,
        params: Operands,
    ) -> Result<f64, CalculatorError> {
        Ok(params.a + params.b)
    }
}

#[tokio::main]
async fn main() -> Result<(), RegistryError> {
    let mut registry = MethodRegistry::new();
    registry.register("add", Add)?;
    registry.register(
        "subtract",
        method_fn(|ops: Operands| async move { Ok::<_, CalculatorError>(ops.a - ops.b) }),
    )?;

    let service = JsonRpcService::new(registry);

    let calls = [
        r#"{"jsonrpc": "2.0", "method": "add", "params": {"a": 5, "b": 3}, "id": 1}"#,
        r#"[
            {"jsonrpc": "2.0", "method": "subtract", "params": {"a": 10, "b": 4}, "id": 2},
            {"jsonrpc": "2.0", "method": "multiply", "params": {"a": 2, "b": 3}, "id": 3},
            {"jsonrpc": "2.0", "method": "add", "params": {"a": "invalid", "b": 5}, "id": 4}
        ]"#,
        "not json at all",
    ];

    for call in calls {
        println!("Request: {}", call);
        let reply = service.handle(post_context(), call.as_bytes()).await;
        println!("{} {}\n", reply.status, String::from_utf8_lossy(&reply.body));
    }

    Ok(())
}

fn post_context() -> RequestContext {
    let mut request = http::Request::new(());
    *request.method_mut() = http::Method::POST;
    let (parts, ()) = request.into_parts();
    RequestContext::from_parts(parts)
}
