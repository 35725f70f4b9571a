use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Inbound `POST /chat` body.
///
/// Both fields are optional at the decode layer so that a missing field is
/// reported as a validation error rather than a decode failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ChatProxyRequest {
    #[schema(example = "session_1a2b3c4d5")]
    pub session_id: Option<String>,
    #[schema(example = "How many patients visited last week?")]
    pub message: Option<String>,
}

/// `{status: "error", message}` as returned for every proxy failure.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorEnvelope {
    #[schema(example = "error")]
    pub status: String,
    pub message: String,
}
