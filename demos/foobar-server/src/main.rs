//! # FooBar JSON-RPC Server
//!
//! A small HTTP JSON-RPC server with three methods:
//! - `FooBar`: echoes `foo` as a key and describes `bar`
//! - `divide`: validated parameters, fails on division by zero
//! - `whoami`: reports the caller's socket address
//!
//! ## Usage
//! ```bash
//! cargo run --package foobar-server -- --port 8000
//! ```
//!
//! ## Example Calls
//! ```bash
//! curl -X POST http://127.0.0.1:8000/rpc \
//!   -H "Content-Type: application/json" \
//!   -d '{"id":1,"jsonrpc":"2.0","method":"FooBar","params":{"foo":"X","bar":10}}'
//!
//! curl -X POST http://127.0.0.1:8000/rpc \
//!   -H "Content-Type: application/json" \
//!   -d '[{"id":1,"jsonrpc":"2.0","method":"divide","params":{"dividend":1,"divisor":0}},
//!        {"id":2,"jsonrpc":"2.0","method":"whoami"}]'
//! ```

use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::net::{IpAddr, SocketAddr};
use tracing::info;

use turul_http_json_rpc_server::prelude::*;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port to listen on
    #[arg(short, long, default_value = "8000")]
    port: u16,

    /// Path of the JSON-RPC endpoint
    #[arg(long, default_value = "/rpc")]
    path: String,

    /// Maximum request body size in bytes
    #[arg(long, default_value = "1048576")]
    max_body_size: usize,

    /// Add permissive CORS headers to every response
    #[arg(long)]
    cors: bool,

    /// Reject calls whose Content-Type is not a JSON media type
    #[arg(long)]
    strict_content_type: bool,
}

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error("division by zero")]
    DivisionByZero,
}

#[derive(Deserialize)]
struct FooBarParams {
    foo: String,
    bar: i64,
}

impl RpcParams for FooBarParams {}

struct FooBar;

#[async_trait]
impl JsonRpcMethod for FooBar {
    type Params = FooBarParams;
    type Output = Value;
    type Error = DemoError;

    async fn call(
        &self,
        _request: &RequestContext,
        params: FooBarParams,
    ) -> Result<Value, DemoError> {
        let mut result = Map::new();
        result.insert(params.foo, json!("foo"));
        result.insert("bar".to_string(), json!(format!("I LIKE {} BARS", params.bar)));
        Ok(Value::Object(result))
    }
}

#[derive(Deserialize)]
struct DivideParams {
    dividend: i64,
    divisor: i64,
}

impl RpcParams for DivideParams {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.dividend == i64::MIN && self.divisor == -1 {
            return Err(ValidationError::new("quotient does not fit in a 64-bit integer"));
        }
        Ok(())
    }
}

struct Whoami;

#[async_trait]
impl JsonRpcMethod for Whoami {
    type Params = ();
    type Output = Value;
    type Error = DemoError;

    async fn call(&self, request: &RequestContext, _params: ()) -> Result<Value, DemoError> {
        Ok(json!({
            "address": request.remote_addr().map(|addr| addr.to_string()),
            "userAgent": request.header("user-agent"),
        }))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let bind_address = SocketAddr::new(args.host, args.port);

    info!("Starting FooBar JSON-RPC server");

    let server = HttpJsonRpcServer::builder()
        .bind_address(bind_address)
        .rpc_path(args.path)
        .max_body_size(args.max_body_size)
        .cors(args.cors)
        .enforce_content_type(args.strict_content_type)
        .register_method("FooBar", FooBar)?
        .register_method(
            "divide",
            method_fn(|params: DivideParams| async move {
                if params.divisor == 0 {
                    return Err(DemoError::DivisionByZero);
                }
                Ok(params.dividend / params.divisor)
            }),
        )?
        .register_method("whoami", Whoami)?
        .build();

    server.run().await?;
    Ok(())
}
