//! Per-request span, trace id propagation and body logging.
//!
//! A valid UUID in the incoming `x-trace-id` header is reused; otherwise a new
//! v4 id is minted. The id is attached to the request span, forwarded to the
//! handler and echoed on the response.

use std::time::Instant;

use axum::body::{Body, Bytes};
use axum::extract::Request;
use axum::http::{HeaderMap, HeaderValue, header};
use axum::middleware::Next;
use axum::response::Response;
use http_body_util::BodyExt;
use tracing::{Instrument, debug, info, info_span};
use uuid::Uuid;

pub const X_TRACE_ID: &str = "x-trace-id";

/// JSON bodies at or above this size are summarized instead of logged.
const MAX_LOGGED_BODY: usize = 1024;

pub async fn trace_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();

    let trace_id = req
        .headers()
        .get(X_TRACE_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    let span = info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        debug!("request started");
        let header_value = HeaderValue::from_str(&trace_id.to_string()).ok();

        let (mut parts, body) = req.into_parts();
        let bytes = buffer_and_log("request", &parts.headers, body).await;
        if let Some(v) = &header_value {
            parts.headers.insert(X_TRACE_ID, v.clone());
        }

        let response = next.run(Request::from_parts(parts, Body::from(bytes))).await;

        let (mut parts, body) = response.into_parts();
        let bytes = buffer_and_log("response", &parts.headers, body).await;
        if let Some(v) = header_value {
            parts.headers.insert(X_TRACE_ID, v);
        }
        let response = Response::from_parts(parts, Body::from(bytes));

        info!(
            status = response.status().as_u16(),
            latency_ms = start.elapsed().as_millis() as u64,
            "response finished"
        );
        response
    }
    .instrument(span)
    .await
}

/// Collect `body`, logging small JSON payloads verbatim and the size of
/// anything else.
async fn buffer_and_log(direction: &str, headers: &HeaderMap, body: Body) -> Bytes {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            debug!(error = %e, direction, "failed to buffer body");
            return Bytes::new();
        }
    };

    if content_type.contains("application/json") && bytes.len() < MAX_LOGGED_BODY {
        if let Ok(text) = std::str::from_utf8(&bytes) {
            debug!(direction, body = text, "body");
        }
    } else if !bytes.is_empty() {
        debug!(direction, content_type, size = bytes.len(), "body skipped");
    }

    bytes
}
