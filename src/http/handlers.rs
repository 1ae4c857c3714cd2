//! Route handlers.
//!
//! Each handler maps one request to one response. The only shared state is
//! `AppState`, which carries the optional cache client and the body limit.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{Query, State},
    http::{header, HeaderMap, Method, StatusCode, Uri, Version},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::agent::{classify, Browser, OperatingSystem};
use crate::cache::Cache;
use crate::http::request::{header_or_empty, ClientIp, UserAgent};
use crate::http::response::{plain_text, ApiError};
use crate::http::server::AppState;

const DEFAULT_NAME: &str = "Guest";

/// Query pairs in arrival order. Repeated keys are kept, not rejected.
pub type QueryPairs = Vec<(String, String)>;

/// `GET /`: greet `name`, or "Guest".
pub async fn greet(Query(params): Query<QueryPairs>) -> Response {
    let name = first_param(&params, "name").unwrap_or_else(|| DEFAULT_NAME.to_string());
    tracing::info!(name = %name, "Received greeting request");
    plain_text(StatusCode::OK, format!("Hello, {}\n", name))
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct InfoResponse {
    pub client_ip: String,
    pub user_agent: String,
    pub accept_language: String,
    pub method: String,
    pub path: String,
    pub protocol: String,
}

/// `GET /info`: basic facts about the request as seen by the server.
pub async fn info(
    ClientIp(client_ip): ClientIp,
    UserAgent(user_agent): UserAgent,
    method: Method,
    uri: Uri,
    version: Version,
    headers: HeaderMap,
) -> Json<InfoResponse> {
    Json(InfoResponse {
        client_ip,
        user_agent,
        accept_language: header_or_empty(&headers, header::ACCEPT_LANGUAGE),
        method: method.to_string(),
        path: uri.path().to_string(),
        protocol: format!("{:?}", version),
    })
}

#[derive(Debug, Serialize)]
pub struct AgentResponse {
    pub browser: Browser,
    pub os: OperatingSystem,
    pub user_agent: String,
    pub client_ip: String,
}

/// `GET /agent`: browser and OS guessed from the user agent.
pub async fn user_agent(
    ClientIp(client_ip): ClientIp,
    UserAgent(user_agent): UserAgent,
) -> Json<AgentResponse> {
    let classification = classify(&user_agent);
    Json(AgentResponse {
        browser: classification.browser,
        os: classification.os,
        user_agent,
        client_ip,
    })
}

/// `GET /headers`: one `Name: v1, v2` line per header, sorted by name.
pub async fn headers(headers: HeaderMap) -> Response {
    plain_text(StatusCode::OK, render_headers(&headers))
}

/// Group values by canonical header name, preserving value order.
///
/// `Host` is request metadata rather than a header field here and is skipped.
pub fn render_headers(headers: &HeaderMap) -> String {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in headers {
        if name == header::HOST {
            continue;
        }
        grouped
            .entry(canonical_header_name(name.as_str()))
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }

    let mut out = String::new();
    for (name, values) in grouped {
        out.push_str(&name);
        out.push_str(": ");
        out.push_str(&values.join(", "));
        out.push('\n');
    }
    out
}

/// `x-test-header` → `X-Test-Header`.
pub fn canonical_header_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if upper {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c.to_ascii_lowercase());
        }
        upper = c == '-';
    }
    out
}

/// `GET /ip`: the resolved client IP.
pub async fn client_ip(ClientIp(ip): ClientIp) -> Response {
    plain_text(StatusCode::OK, format!("{}\n", ip))
}

/// `GET /echo`: echo `msg`.
pub async fn echo_query(Query(params): Query<QueryPairs>) -> Response {
    match first_param(&params, "msg") {
        Some(msg) => plain_text(StatusCode::OK, format!("{}\n", msg)),
        None => plain_text(StatusCode::OK, "no message\n"),
    }
}

/// `POST /echo`: echo the request body verbatim.
pub async fn echo_body(State(state): State<AppState>, body: Body) -> Result<Response, ApiError> {
    let bytes: Bytes = axum::body::to_bytes(body, state.max_body_size)
        .await
        .map_err(|e| {
            tracing::debug!(error = %e, "Failed to read echo body");
            ApiError::BadRequest("failed to read body".into())
        })?;

    if bytes.is_empty() {
        return Ok(plain_text(StatusCode::OK, "empty body\n"));
    }
    Ok(plain_text(StatusCode::OK, bytes))
}

/// `GET /redis?key=...`: look `key` up in the cache.
///
/// Only routed when a cache is configured, so the state is the cache itself.
pub async fn cache_lookup(
    State(cache): State<Arc<dyn Cache>>,
    Query(params): Query<QueryPairs>,
) -> Result<Response, ApiError> {
    let key = first_param(&params, "key")
        .ok_or_else(|| ApiError::BadRequest("Query parameter 'key' is required".into()))?;

    match cache.get(&key).await {
        Ok(Some(value)) => Ok(plain_text(StatusCode::OK, format!("{}\n", value))),
        Ok(None) => Err(ApiError::NotFound(format!("Key '{}' not found", key))),
        Err(e) => {
            tracing::error!(key = %key, error = %e, "Cache GET failed");
            Err(ApiError::Internal("Failed to retrieve data from cache"))
        }
    }
}

/// Fallback for unknown paths.
pub async fn not_found() -> impl IntoResponse {
    plain_text(StatusCode::NOT_FOUND, "404 page not found\n")
}

/// First value of `name`, or `None` when absent or empty. Later repeats are ignored.
pub fn first_param(params: &[(String, String)], name: &str) -> Option<String> {
    params
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.clone())
        .filter(|v| !v.is_empty())
}
