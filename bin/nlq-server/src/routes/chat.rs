//! `POST /chat`: validate and forward a message to the chat webhook.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::response::Response;
use axum::routing::post;
use axum::Router;
use nlq_types::ChatRequest;
use serde_json::error::Category;
use tracing::info;
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::routes::relay;
use crate::schemas::chat::{ChatProxyRequest, ErrorEnvelope};
use crate::state::AppState;

pub const MISSING_FIELDS: &str = "Missing session_id or message";
pub const UPSTREAM_FAILED: &str = "Failed to get response from server";

#[derive(OpenApi)]
#[openapi(
    paths(post_chat),
    components(schemas(ChatProxyRequest, ErrorEnvelope))
)]
pub struct ChatApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/chat", post(post_chat))
}

#[utoipa::path(
    post,
    path = "/chat",
    tag = "chat",
    request_body = ChatProxyRequest,
    responses(
        (status = 200, description = "Webhook reply, passed through", body = serde_json::Value),
        (status = 400, description = "session_id or message missing", body = ErrorEnvelope),
        (status = 500, description = "Proxy failure", body = ErrorEnvelope),
    )
)]
pub async fn post_chat(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, ServerError> {
    let req = decode_request(&body)?;
    let (Some(session_id), Some(message)) = (
        req.session_id.filter(|s| !s.is_empty()),
        req.message.filter(|m| !m.is_empty()),
    ) else {
        return Err(ServerError::BadRequest(MISSING_FIELDS.to_owned()));
    };

    info!(%session_id, len = message.len(), "forwarding chat message");
    let resp = state
        .http
        .post(state.chat_url.clone())
        .json(&ChatRequest {
            session_id,
            message,
        })
        .send()
        .await?;

    relay(resp, UPSTREAM_FAILED).await
}

/// Malformed JSON is a local failure; well-formed JSON of the wrong shape is
/// treated as missing fields.
fn decode_request(body: &[u8]) -> Result<ChatProxyRequest, ServerError> {
    serde_json::from_slice(body).map_err(|e| match e.classify() {
        Category::Data => ServerError::BadRequest(MISSING_FIELDS.to_owned()),
        _ => ServerError::Json(e),
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::INTERNAL_ERROR_MESSAGE;
    use crate::routes::test_support::{app, send};
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use nlq_types::{ApiResponse, ResponseType};
    use serde_json::json;
    use tracing_test::traced_test;
    use wiremock::matchers::{body_json, header as header_is, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CHAT_PATH: &str = "/webhook/nlq-v2";

    fn chat_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/chat")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    #[tokio::test]
    async fn text_reply_round_trips_to_display_message() {
        let upstream = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(CHAT_PATH))
            .and(header_is("content-type", "application/json"))
            .and(body_json(json!({"session_id": "s1", "message": "hello"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "data": {"type": "text", "text": {"value": "hi there"}}
            })))
            .expect(1)
            .mount(&upstream)
            .await;

        let (status, body) = send(
            app(&upstream.uri()),
            chat_request(r#"{"session_id":"s1","message":"hello"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let envelope: ApiResponse = serde_json::from_value(body).unwrap();
        let msg = nlq_core::message::from_envelope(envelope);
        assert_eq!(msg.content, "hi there");
        assert_eq!(msg.response_type, Some(ResponseType::Text));
    }

    #[tokio::test]
    async fn missing_message_is_rejected_without_calling_remote() {
        let upstream = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&upstream)
            .await;

        for body in [
            r#"{"session_id":"s1"}"#,
            r#"{"message":"hello"}"#,
            r#"{"session_id":"","message":"hello"}"#,
            r#"{"session_id":"s1","message":""}"#,
            r#"{"session_id":5,"message":"hello"}"#,
        ] {
            let (status, resp) = send(app(&upstream.uri()), chat_request(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body {body}");
            assert_eq!(
                resp,
                json!({"status": "error", "message": MISSING_FIELDS}),
                "body {body}"
            );
        }
    }

    #[tokio::test]
    async fn malformed_body_is_internal_error() {
        let upstream = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&upstream)
            .await;

        let (status, body) = send(app(&upstream.uri()), chat_request("{not json")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], INTERNAL_ERROR_MESSAGE);
    }

    #[tokio::test]
    #[traced_test]
    async fn upstream_error_status_is_mirrored() {
        let upstream = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(CHAT_PATH))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&upstream)
            .await;

        let (status, body) = send(
            app(&upstream.uri()),
            chat_request(r#"{"session_id":"s1","message":"hello"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, json!({"status": "error", "message": UPSTREAM_FAILED}));
        assert!(logs_contain("webhook returned an error status"));
    }

    #[tokio::test]
    async fn non_json_upstream_body_is_internal_error() {
        let upstream = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(CHAT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&upstream)
            .await;

        let (status, body) = send(
            app(&upstream.uri()),
            chat_request(r#"{"session_id":"s1","message":"hello"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], INTERNAL_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn unreachable_upstream_is_internal_error() {
        // Port 9 (discard) is not listening in test environments.
        let (status, body) = send(
            app("http://127.0.0.1:9"),
            chat_request(r#"{"session_id":"s1","message":"hello"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], INTERNAL_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn error_envelope_from_remote_passes_through() {
        let upstream = MockServer::start().await;
        let reply = json!({"status": "error", "message": "No data for that question"});
        Mock::given(method("POST"))
            .and(path(CHAT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply.clone()))
            .mount(&upstream)
            .await;

        let (status, body) = send(
            app(&upstream.uri()),
            chat_request(r#"{"session_id":"s1","message":"hello"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, reply);
    }
}
