//! Axum HTTP handlers for the web server
//!
//! `/sse` opens a session stream announcing the message endpoint, and
//! `/messages` accepts the JSON-RPC traffic. Every failure inside message
//! handling is turned into a JSON-RPC error envelope here; only routing
//! failures come back as plain text.

use std::convert::Infallible;

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, QueryRejection},
        Query, State,
    },
    http::{HeaderMap, StatusCode},
    response::{
        sse::{Event, Sse},
        IntoResponse, Response,
    },
    Json,
};
use axum_extra::{headers::Host, TypedHeader};
use futures::{Stream, StreamExt};
use serde::Deserialize;

use crate::errors::AppError;
use crate::mcp::server::{handle_message, Dispatch};
use crate::session::SessionStream;
use crate::AppState;

const FORWARDED_PROTO: &str = "x-forwarded-proto";

#[derive(Debug, Deserialize)]
pub struct MessagesQuery {
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

pub async fn sse_endpoint(
    State(state): State<AppState>,
    host: Option<TypedHeader<Host>>,
    headers: HeaderMap,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let forwarded_proto = headers
        .get(FORWARDED_PROTO)
        .and_then(|value| value.to_str().ok());
    let origin = resolve_origin(
        state.public_url.as_deref(),
        host.map(|TypedHeader(host)| host.to_string()),
        forwarded_proto,
        &state.fallback_origin,
    );

    let stream = SessionStream::open(&origin, state.heartbeat_interval)
        .take_until(state.shutdown_requested())
        .map(|frame| Ok::<_, Infallible>(frame.into_event()));
    Sse::new(stream)
}

/// Extractor rejections are taken as values so that a bad query string or an
/// unreadable body still gets a JSON-RPC error envelope.
pub async fn messages_endpoint(
    State(state): State<AppState>,
    query: Result<Query<MessagesQuery>, QueryRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let outcome = match (query, body) {
        (Ok(Query(query)), Ok(body)) => {
            handle_message(&state, &body, query.session_id.as_deref()).await
        }
        (Err(rejection), _) => Err(AppError::malformed(format!(
            "invalid query string: {}",
            rejection.body_text()
        ))),
        (_, Err(rejection)) => Err(AppError::malformed(format!(
            "unreadable request body: {}",
            rejection.body_text()
        ))),
    };

    match outcome {
        Ok(Dispatch::Reply(response)) => (StatusCode::OK, Json(response)).into_response(),
        Ok(Dispatch::Acknowledged) => StatusCode::OK.into_response(),
        Err(err) => err.into_rpc_response(state.error_codes),
    }
}

pub async fn method_not_allowed() -> (StatusCode, &'static str) {
    (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
}

pub async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}

/// Picks the origin clients should use to reach `/messages`: a configured
/// public URL wins, then the request's `Host`, then the bind address.
pub fn resolve_origin(
    public_url: Option<&str>,
    host: Option<String>,
    forwarded_proto: Option<&str>,
    fallback: &str,
) -> String {
    if let Some(public_url) = public_url {
        return public_url.to_string();
    }

    match host {
        Some(host) => {
            let scheme = match forwarded_proto.map(str::trim) {
                Some("https") => "https",
                _ => "http",
            };
            format!("{scheme}://{host}")
        }
        None => fallback.to_string(),
    }
}
