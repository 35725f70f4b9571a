use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::routes::{chat, health, sessions};
use crate::state::AppState;

pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(info(
    title = "nlq-server",
    description = "Pass-through proxy for the nlq chat and sessions webhooks",
    version = "0.1.0",
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(health::HealthApi::openapi());
    root.merge(chat::ChatApi::openapi());
    root.merge(sessions::SessionsApi::openapi());
    root
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route(OPENAPI_PATH, get(|| async { Json(get_docs()) }))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Config;
    use crate::routes::build;
    use crate::routes::test_support::{app, send};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};

    #[test]
    fn document_lists_every_route() {
        let doc = get_docs();
        for path in ["/health", "/chat", "/sessions"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[tokio::test]
    async fn served_when_enabled() {
        let req = Request::builder().uri(OPENAPI_PATH).body(Body::empty()).unwrap();
        let (status, body) = send(app("http://127.0.0.1:9"), req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["info"]["title"], "nlq-server");
    }

    #[tokio::test]
    async fn hidden_when_disabled() {
        let config = Config {
            enable_openapi: false,
            ..Config::default()
        };
        let app = build(Arc::new(AppState::new(config).unwrap()));
        let req = Request::builder().uri(OPENAPI_PATH).body(Body::empty()).unwrap();
        let (status, _) = send(app, req).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
