//! `GET /sessions`: list, read or delete sessions through the sessions webhook.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::Response;
use axum::routing::get;
use nlq_core::client::sessions_url;
use tracing::info;
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::routes::relay;
use crate::schemas::chat::ErrorEnvelope;
use crate::schemas::sessions::SessionsQuery;
use crate::state::AppState;

pub const UPSTREAM_FAILED: &str = "Failed to process request";

#[derive(OpenApi)]
#[openapi(paths(get_sessions), components(schemas(ErrorEnvelope)))]
pub struct SessionsApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/sessions", get(get_sessions))
}

#[utoipa::path(
    get,
    path = "/sessions",
    tag = "sessions",
    params(SessionsQuery),
    responses(
        (status = 200, description = "Webhook reply, passed through", body = serde_json::Value),
        (status = 500, description = "Proxy failure", body = ErrorEnvelope),
    )
)]
pub async fn get_sessions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionsQuery>,
) -> Result<Response, ServerError> {
    let url = sessions_url(&state.sessions_url, query.id.as_deref(), query.is_delete());
    info!(
        id = query.id.as_deref().unwrap_or(""),
        delete = query.is_delete(),
        "forwarding sessions request"
    );

    let resp = state
        .http
        .get(url)
        .header(header::CONTENT_TYPE, "application/json")
        .send()
        .await?;

    relay(resp, UPSTREAM_FAILED).await
}
