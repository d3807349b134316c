//! End-to-end tests over a real socket
//!
//! Each test binds an ephemeral port, serves it from a background task and
//! talks to it with reqwest.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;

use turul_http_json_rpc_server::{HttpJsonRpcServer, HttpJsonRpcServerBuilder};
use turul_json_rpc_server::{JsonRpcMethod, RequestContext, RpcParams, ValidationError, method_fn};

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct TestError(String);

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
    type Error = TestError;

    async fn call(
        &self,
        _request: &RequestContext,
        params: FooBarParams,
    ) -> Result<Value, TestError> {
        let mut result = serde_json::Map::new();
        result.insert(params.foo, json!("foo"));
        result.insert("bar".to_string(), json!(format!("I LIKE {} BARS", params.bar)));
        Ok(Value::Object(result))
    }
}

#[derive(Deserialize)]
struct SleepParams {
    millis: u64,
}

impl RpcParams for SleepParams {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.millis > 1_000 {
            return Err(ValidationError::new("millis must be at most 1000"));
        }
        Ok(())
    }
}

struct Peer;

#[async_trait]
impl JsonRpcMethod for Peer {
    type Params = ();
    type Output = Option<String>;
    type Error = TestError;

    async fn call(
        &self,
        request: &RequestContext,
        _params: (),
    ) -> Result<Option<String>, TestError> {
        Ok(request.remote_addr().map(|addr| addr.ip().to_string()))
    }
}

fn builder() -> anyhow::Result<HttpJsonRpcServerBuilder> {
    let builder = HttpJsonRpcServer::builder()
        .register_method("FooBar", FooBar)?
        .register_method(
            "sleep",
            method_fn(|params: SleepParams| async move {
                tokio::time::sleep(Duration::from_millis(params.millis)).await;
                Ok::<_, TestError>(params.millis)
            }),
        )?
        .register_method(
            "fail",
            method_fn(|_: Value| async move { Err::<Value, _>(TestError("always fails".into())) }),
        )?
        .register_method("peer", Peer)?;
    Ok(builder)
}

/// Serve on an ephemeral port and return the endpoint URL
async fn start_server(server: HttpJsonRpcServer) -> anyhow::Result<String> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr: SocketAddr = listener.local_addr()?;
    let path = server.config().rpc_path.clone();

    tokio::spawn(async move {
        if let Err(err) = server.serve(listener).await {
            tracing::error!("test server stopped: {}", err);
        }
    });

    Ok(format!("http://{}{}", addr, path))
}

async fn post(
    client: &Client,
    url: &str,
    body: &'static str,
) -> anyhow::Result<(StatusCode, String)> {
    let response = client
        .post(url)
        .header("Content-Type", "application/json")
        .body(body)
        .send()
        .await?;
    let status = response.status();
    Ok((status, response.text().await?))
}

#[tokio::test]
async fn test_single_call() -> anyhow::Result<()> {
    let url = start_server(builder()?.build()).await?;

    let (status, body) = post(
        &Client::new(),
        &url,
        r#"{"id":1,"jsonrpc":"2.0","method":"FooBar","params":{"foo":"X","bar":10}}"#,
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"id":1,"jsonrpc":"2.0","result":{"X":"foo","bar":"I LIKE 10 BARS"}}"#);
    Ok(())
}

#[tokio::test]
async fn test_batch_keeps_request_order() -> anyhow::Result<()> {
    let url = start_server(builder()?.build()).await?;

    let (status, body) = post(
        &Client::new(),
        &url,
        r#"[
            {"id":1,"jsonrpc":"2.0","method":"sleep","params":{"millis":150}},
            {"id":2,"jsonrpc":"2.0","method":"sleep","params":{"millis":5}},
            {"id":3,"jsonrpc":"2.0","method":"missing"},
            {"id":4,"jsonrpc":"2.0","method":"sleep","params":{"millis":"soon"}},
            {"id":5,"jsonrpc":"2.0","method":"sleep","params":{"millis":5000}},
            {"id":6,"jsonrpc":"2.0","method":"fail"}
        ]"#,
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    let value: Value = serde_json::from_str(&body)?;
    let ids: Vec<i64> = value
        .as_array()
        .map(|slots| slots.iter().filter_map(|slot| slot["id"].as_i64()).collect())
        .unwrap_or_default();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);

    assert_eq!(value[0]["result"], 150);
    assert_eq!(value[1]["result"], 5);
    assert_eq!(value[2]["error"]["code"], -32601);
    assert_eq!(value[3]["error"]["code"], -32602);
    assert_eq!(value[4]["error"]["code"], -32602);
    assert_eq!(value[4]["error"]["message"], "millis must be at most 1000");
    assert_eq!(value[5]["error"]["code"], -32603);
    assert_eq!(value[5]["error"]["message"], "always fails");
    Ok(())
}

#[tokio::test]
async fn test_batch_runs_concurrently() -> anyhow::Result<()> {
    let url = start_server(builder()?.build()).await?;

    let started = std::time::Instant::now();
    let (status, _) = post(
        &Client::new(),
        &url,
        r#"[
            {"id":1,"jsonrpc":"2.0","method":"sleep","params":{"millis":300}},
            {"id":2,"jsonrpc":"2.0","method":"sleep","params":{"millis":300}},
            {"id":3,"jsonrpc":"2.0","method":"sleep","params":{"millis":300}},
            {"id":4,"jsonrpc":"2.0","method":"sleep","params":{"millis":300}}
        ]"#,
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert!(started.elapsed() < Duration::from_millis(1_000));
    Ok(())
}

#[tokio::test]
async fn test_get_is_rejected() -> anyhow::Result<()> {
    let url = start_server(builder()?.build()).await?;

    let response = Client::new().get(&url).send().await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.text().await?,
        r#"{"jsonrpc":"2.0","error":{"code":-32700,"message":"invalid HTTP method"}}"#
    );
    Ok(())
}

#[tokio::test]
async fn test_garbage_is_rejected() -> anyhow::Result<()> {
    let url = start_server(builder()?.build()).await?;

    let (status, body) = post(&Client::new(), &url, "ASDKLASDJLAKSJDLKASJADS").await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let value: Value = serde_json::from_str(&body)?;
    assert_eq!(value["jsonrpc"], "2.0");
    assert_eq!(value["error"]["code"], -32700);
    assert!(value.get("id").is_none());
    Ok(())
}

#[tokio::test]
async fn test_oversized_body_is_rejected() -> anyhow::Result<()> {
    let url = start_server(builder()?.max_body_size(32).build()).await?;

    let (status, body) = post(
        &Client::new(),
        &url,
        r#"{"id":1,"jsonrpc":"2.0","method":"FooBar","params":{"foo":"X","bar":10}}"#,
    )
    .await?;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    let value: Value = serde_json::from_str(&body)?;
    assert_eq!(value["error"]["code"], -32700);
    Ok(())
}

#[tokio::test]
async fn test_strict_content_type() -> anyhow::Result<()> {
    let url = start_server(builder()?.enforce_content_type(true).build()).await?;
    let client = Client::new();

    let response = client
        .post(&url)
        .header("Content-Type", "text/plain")
        .body(r#"{"id":1,"jsonrpc":"2.0","method":"peer"}"#)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let response = client
        .post(&url)
        .header("Content-Type", "text/json")
        .body(r#"{"id":1,"jsonrpc":"2.0","method":"peer"}"#)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_peer_address_is_visible() -> anyhow::Result<()> {
    let url = start_server(builder()?.build()).await?;

    let call = r#"{"id":"who","jsonrpc":"2.0","method":"peer"}"#;
    let (_, body) = post(&Client::new(), &url, call).await?;

    let value: Value = serde_json::from_str(&body)?;
    assert_eq!(value["id"], "who");
    assert_eq!(value["result"], "127.0.0.1");
    Ok(())
}

#[tokio::test]
async fn test_other_paths_are_not_found() -> anyhow::Result<()> {
    let url = start_server(builder()?.rpc_path("/jsonrpc").build()).await?;
    let other = url.replace("/jsonrpc", "/nope");

    let call = r#"{"id":1,"jsonrpc":"2.0","method":"peer"}"#;
    let (status, _) = post(&Client::new(), &other, call).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = post(&Client::new(), &url, call).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_duplicate_registration_is_refused() -> anyhow::Result<()> {
    let result = builder()?.register_method("FooBar", FooBar);

    let err = match result {
        Ok(_) => anyhow::bail!("second FooBar registration was accepted"),
        Err(err) => err,
    };
    assert!(err.to_string().contains("FooBar"));
    Ok(())
}
