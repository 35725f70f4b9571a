//! Axum router construction.
//!
//! [`build`] assembles the complete application router:
//! - middleware layers (CORS, per-request trace id)
//! - the optional OpenAPI document (disable with `NLQ_ENABLE_OPENAPI=false`)
//! - health route
//! - the `/chat` and `/sessions` webhook proxies

mod chat;
pub mod doc;
mod health;
mod sessions;

use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use axum::{Json, Router, middleware};
use serde_json::Value;
use tracing::debug;

use crate::error::ServerError;
use crate::middleware::{cors, trace};
use crate::state::AppState;

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .merge(health::router())
        .merge(chat::router())
        .merge(sessions::router());

    if state.config.enable_openapi {
        app = app.merge(doc::router());
    }

    app
        .layer(cors::cors_layer(state.config.cors_allowed_origins.as_deref()))
        .layer(middleware::from_fn(trace::trace_middleware))
        .with_state(state)
}

// ── Upstream relay ────────────────────────────────────────────────────────────

/// Pass a webhook response back to the caller.
///
/// A 2xx response is relayed with its status and JSON body. Any other status
/// becomes `failure` with the same status code. A body that is not JSON is a
/// local failure.
async fn relay(resp: reqwest::Response, failure: &'static str) -> Result<Response, ServerError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(ServerError::Upstream {
            status,
            message: failure,
        });
    }
    let bytes = resp.bytes().await?;
    let body: Value = serde_json::from_slice(&bytes)?;
    debug!(status = status.as_u16(), len = bytes.len(), "relaying webhook response");
    Ok((status, Json(body)).into_response())
}
