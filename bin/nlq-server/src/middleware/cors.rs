use tower_http::cors::{Any, CorsLayer};

use axum::http::HeaderValue;

/// CORS layer for a comma-separated origin list. Unset, empty or entirely
/// unparseable lists allow any origin.
pub fn cors_layer(allowed_origins: Option<&str>) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect();

    let layer = CorsLayer::new().allow_headers(Any).allow_methods(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, header};
    use axum::routing::get;
    use tower::ServiceExt;

    async fn allow_origin_for(config: Option<&str>, origin: &str) -> Option<String> {
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(cors_layer(config));
        let req = Request::builder()
            .uri("/")
            .header(header::ORIGIN, origin)
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        resp.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .map(|v| v.to_str().unwrap().to_owned())
    }

    #[tokio::test]
    async fn wildcard_when_unset() {
        assert_eq!(
            allow_origin_for(None, "http://anywhere.test").await.as_deref(),
            Some("*")
        );
    }

    #[tokio::test]
    async fn restricted_list() {
        let config = Some("http://a.test, http://b.test");
        assert_eq!(
            allow_origin_for(config, "http://b.test").await.as_deref(),
            Some("http://b.test")
        );
        assert_eq!(allow_origin_for(config, "http://evil.test").await, None);
    }
}
