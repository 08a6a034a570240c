use std::collections::BTreeMap;

use axum::{
    extract::Path,
    response::Redirect,
    http::{HeaderMap, Method, StatusCode},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Body bytes served by `/bytes`: `f`, `o`, then a lone `0xff`.
pub const INVALID_UTF8: &[u8] = &[0x66, 0x6f, 0xff];

/// What `/echo` saw of the incoming request.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Echo {
    pub method: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/json", get(json_body))
        .route("/text", get(|| async { "not json" }))
        .route("/hello", get(|| async { "hello" }))
        .route("/empty", get(|| async { "" }))
        .route("/bytes", get(|| async { INVALID_UTF8.to_vec() }))
        .route("/headers", get(fixed_headers))
        .route("/status/{code}", get(status))
        .route("/redirect", get(|| async { Redirect::temporary("/hello") }))
        .route("/echo", any(echo))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn json_body() -> Json<Value> {
    Json(json!({"message": "hello", "count": 2, "tags": ["a", "b"]}))
}

async fn fixed_headers() -> ([(&'static str, &'static str); 2], &'static str) {
    ([("x-fixture", "1"), ("cache-control", "no-store")], "ok")
}

async fn status(Path(code): Path<u16>) -> (StatusCode, String) {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, format!("status {code}"))
}

async fn echo(method: Method, headers: HeaderMap, body: String) -> Json<Echo> {
    log::debug!("echo {method} with {} body bytes", body.len());
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    Json(Echo {
        method: method.to_string(),
        headers,
        body,
    })
}
