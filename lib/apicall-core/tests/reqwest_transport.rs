//! End-to-end dispatch through [`ReqwestTransport`] against a live axum server.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use apicall_core::{
    ApiClient, ApiClientError, ApiResult, EndpointConfig, ErrorResponse, Outcome, RequestParams,
    TransportError,
};
use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Auth {
    email: String,
    password: String,
}

#[derive(Debug, Deserialize, PartialEq)]
struct Echo {
    content_type: Option<String>,
    body: String,
}

async fn echo_user(headers: HeaderMap, body: String) -> Json<Value> {
    let content_type = headers
        .get("content-type")
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string);
    Json(json!({ "content_type": content_type, "body": body }))
}

async fn login(Json(auth): Json<Auth>) -> (StatusCode, Json<Value>) {
    if auth.password == "secret" {
        (StatusCode::OK, Json(json!({ "token": "t0k3n" })))
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({})))
    }
}

async fn post_user(Path(post): Path<u32>, Json(body): Json<Value>) -> Json<Value> {
    Json(json!({ "post": post, "received": body }))
}

async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_secs(5)).await;
    "too late"
}

async fn launch() -> anyhow::Result<SocketAddr> {
    let app = Router::new()
        .route("/user", get(echo_user))
        .route("/user/login", post(login))
        .route("/backend/user/{post}", post(post_user))
        .route("/slow", get(slow));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("binding server")?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(error) = axum::serve(listener, app.into_make_service()).await {
            tracing::error!(?error, "Server launch failed");
        }
    });

    Ok(addr)
}

async fn client() -> anyhow::Result<ApiClient> {
    let addr = launch().await?;
    let client = ApiClient::builder()
        .with_base_url(format!("http://{addr}").as_str())?
        .build()?;
    Ok(client)
}

const GET_USER: EndpointConfig = EndpointConfig::get("/user").with_raw_body();
const USER_LOGIN: EndpointConfig = EndpointConfig::post("/user/login").with_json_body();
const POST_USER: EndpointConfig = EndpointConfig::post("backend/user/{post}").with_json_body();
const SLOW: EndpointConfig = EndpointConfig::get("/slow");

#[tokio::test]
async fn should_send_raw_body_over_http() -> anyhow::Result<()> {
    let client = client().await?;

    let outcome = client
        .dispatch::<Echo>(&GET_USER, RequestParams::new().with_raw_body("{}"))?
        .await;

    let echo = outcome.settled().context("settled")?;
    assert_eq!(
        echo,
        Echo {
            content_type: Some("application/json; charset=utf-8".to_string()),
            body: "{}".to_string(),
        }
    );
    Ok(())
}

#[tokio::test]
async fn should_post_structured_body_to_resolved_path() -> anyhow::Result<()> {
    let client = client().await?;
    let params = RequestParams::new()
        .with_path_param("post", 7)
        .with_json_body(&json!({"a": 1}))?;

    let outcome = client.dispatch::<Value>(&POST_USER, params)?.await;

    let value = outcome.settled().context("settled")?;
    insta::assert_snapshot!(value, @r#"{"post":7,"received":{"a":1}}"#);
    Ok(())
}

#[tokio::test]
async fn should_return_domain_error_on_unauthorized() -> anyhow::Result<()> {
    let client = client().await?;
    let auth = Auth {
        email: "jo@example.com".to_string(),
        password: "wrong".to_string(),
    };
    let params = RequestParams::new().with_json_body(&auth)?;

    let outcome = client
        .dispatch::<ApiResult<Value, ErrorResponse>>(&USER_LOGIN, params)?
        .await;

    let result = outcome.settled().context("settled")?;
    assert_eq!(
        result,
        ApiResult::Err {
            error: ErrorResponse {
                status: 401,
                body: Some(json!({})),
            }
        }
    );
    Ok(())
}

#[tokio::test]
async fn should_decode_successful_login() -> anyhow::Result<()> {
    let client = client().await?;
    let auth = Auth {
        email: "jo@example.com".to_string(),
        password: "secret".to_string(),
    };
    let params = RequestParams::new().with_json_body(&auth)?;

    let outcome = client
        .dispatch::<ApiResult<Value, StatusCode>>(&USER_LOGIN, params)?
        .await;

    let result = outcome.settled().context("settled")?;
    assert_eq!(result.into_result(), Ok(json!({ "token": "t0k3n" })));
    Ok(())
}

#[tokio::test]
async fn should_cancel_in_flight_http_call() -> anyhow::Result<()> {
    let client = client().await?;

    let operation = client.dispatch::<String>(&SLOW, RequestParams::new())?;
    let handle = operation.cancel_handle();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.cancel();
    });

    let outcome = tokio::time::timeout(Duration::from_secs(2), operation)
        .await
        .context("cancellation should resolve the operation promptly")?;

    assert!(outcome.is_canceled());
    Ok(())
}

#[tokio::test]
async fn should_report_connection_failure() -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    let client = ApiClient::builder()
        .with_base_url(format!("http://{addr}").as_str())?
        .build()?;

    let outcome = client.dispatch::<Value>(&SLOW, RequestParams::new())?.await;

    assert!(matches!(
        outcome,
        Outcome::Failed(ApiClientError::TransportError(TransportError::Request(_)))
    ));
    Ok(())
}
