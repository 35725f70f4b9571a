//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`. Errors render as the same
//! `{status: "error", message}` envelope the webhooks use, so clients decode
//! one shape for every outcome.
//!
//! Transport and decode failures are logged in full but answered with a
//! generic 500; upstream URLs and serde positions never reach the client.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

use crate::schemas::chat::ErrorEnvelope;

/// Body message for every local failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug, Error)]
pub enum ServerError {
    /// The caller sent an invalid or incomplete request.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The webhook answered with a non-2xx status.
    #[error("upstream returned {status}")]
    Upstream {
        status: StatusCode,
        message: &'static str,
    },

    /// The webhook could not be reached or its body could not be read.
    #[error("upstream request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A request or response body was not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ServerError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ServerError::Upstream { status, message } => {
                warn!(status = status.as_u16(), "webhook returned an error status");
                (status, message.to_owned())
            }
            ServerError::Http(e) => {
                error!(error = %e, "webhook request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE.to_owned())
            }
            ServerError::Json(e) => {
                error!(error = %e, "JSON decode failed");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE.to_owned())
            }
        };
        let body = ErrorEnvelope {
            status: "error".to_owned(),
            message,
        };
        (status, Json(body)).into_response()
    }
}
