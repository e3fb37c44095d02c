//! The relay application: preflight, health banner, and the forwarder.
//!
//! | Method | Path | Answer |
//! |---|---|---|
//! | `OPTIONS` | any | `200`, empty body |
//! | `GET` | `/` | `200`, [`BANNER`](crate::health::BANNER) |
//! | `GET` | anything else | upstream answer, passed through or wrapped |
//! | other | any | `501`, empty body |
//!
//! CORS headers are added by the server, not here.

use http::{HeaderValue, Method, StatusCode};
use tracing::info;

use crate::health;
use crate::request::Request;
use crate::response::{ContentType, Response};
use crate::router::Router;
use crate::upstream::{Upstream, UpstreamError, UpstreamReply};

/// Builds the relay's router around `upstream`.
pub fn router(upstream: Upstream) -> Router {
    Router::new()
        .on(Method::GET, "/", health::banner)
        .fallback(Method::GET, move |req: Request| {
            let upstream = upstream.clone();
            async move { forward(&upstream, &req).await }
        })
        .fallback(Method::OPTIONS, preflight)
}

/// CORS preflight. Never contacts the upstream.
pub async fn preflight(_req: Request) -> Response {
    Response::json(Vec::new())
}

/// Relays one GET to the upstream and maps the outcome onto a response.
pub async fn forward(upstream: &Upstream, req: &Request) -> Response {
    info!(path = req.target(), upstream = %upstream.url_for(req.target()), "proxying GET");

    match upstream.fetch(req.target()).await {
        Ok(reply) => relayed(reply),
        Err(e) => failed(e),
    }
}

fn relayed(reply: UpstreamReply) -> Response {
    let content_type = reply
        .content_type
        .unwrap_or_else(|| HeaderValue::from_static(ContentType::Json.as_str()));
    Response::builder()
        .status(reply.status)
        .typed(content_type, reply.body.to_vec())
}

fn failed(e: UpstreamError) -> Response {
    match e {
        UpstreamError::Status { status, ref body } if body.is_empty() => {
            passed_through(status, e.to_string().into_bytes())
        }
        UpstreamError::Status { status, body } => passed_through(status, body.to_vec()),
        UpstreamError::Transport(message) => Response::builder()
            .status(StatusCode::BAD_GATEWAY)
            .bytes(ContentType::Json, envelope(&message).into_bytes()),
    }
}

/// Upstream error statuses keep their body but are always labelled JSON.
fn passed_through(status: StatusCode, body: Vec<u8>) -> Response {
    Response::builder().status(status).bytes(ContentType::Json, body)
}

/// `{"error": "proxy_failed", "message": …}` with `message` JSON-escaped.
pub fn envelope(message: &str) -> String {
    let message = serde_json::Value::from(message);
    format!(r#"{{"error": "proxy_failed", "message": {message}}}"#)
}
