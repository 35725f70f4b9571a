//! HTTP client for the nlq proxy.
//!
//! [`ChatBackend`] is the seam the chat controller talks through; the default
//! implementation is [`ProxyClient`]. Bodies are decoded whatever the HTTP
//! status, because the proxy answers failures with the same
//! `{status, message}` envelope the UI displays.

use std::future::Future;

use nlq_types::{
    ApiResponse, ChatRequest, SessionMessagesResponse, SessionsListResponse, StatusResponse,
};
use reqwest::Url;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The configured base URL could not be parsed.
    #[error("invalid base URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// Transport-level failure (connect, TLS, timeout, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body was not the expected JSON envelope.
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Operations the chat UI needs from the remote side.
pub trait ChatBackend: Send + Sync {
    fn send_message(
        &self,
        req: &ChatRequest,
    ) -> impl Future<Output = Result<ApiResponse, ClientError>> + Send;

    fn list_sessions(
        &self,
    ) -> impl Future<Output = Result<SessionsListResponse, ClientError>> + Send;

    fn session_messages(
        &self,
        session_id: &str,
    ) -> impl Future<Output = Result<SessionMessagesResponse, ClientError>> + Send;

    fn delete_session(
        &self,
        session_id: &str,
    ) -> impl Future<Output = Result<StatusResponse, ClientError>> + Send;
}

/// Build a sessions URL: bare when `id` is absent or empty, otherwise
/// `?id=<id>` followed by `&delete=true` when requested.
pub fn sessions_url(base: &Url, id: Option<&str>, delete: bool) -> Url {
    let mut url = base.clone();
    if let Some(id) = id.filter(|id| !id.is_empty()) {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("id", id);
        if delete {
            pairs.append_pair("delete", "true");
        }
    }
    url
}

/// reqwest-backed [`ChatBackend`] talking to `nlq-server`.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    base_url: Url,
    http: reqwest::Client,
}

impl ProxyClient {
    /// Create a client for the proxy rooted at `base_url`
    /// (e.g. `"http://localhost:3000"`).
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_http(base_url, reqwest::Client::new())
    }

    pub fn with_http(base_url: &str, http: reqwest::Client) -> Result<Self, ClientError> {
        // A trailing slash keeps `join` from replacing the last path segment.
        let normalized = if base_url.ends_with('/') {
            base_url.to_owned()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized).map_err(|e| ClientError::InvalidUrl {
            url: base_url.to_owned(),
            message: e.to_string(),
        })?;
        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidUrl {
                url: format!("{}{path}", self.base_url),
                message: e.to_string(),
            })
    }

    async fn get_sessions<T: DeserializeOwned>(
        &self,
        id: Option<&str>,
        delete: bool,
    ) -> Result<T, ClientError> {
        let url = sessions_url(&self.endpoint("sessions")?, id, delete);
        debug!(%url, "GET sessions");
        let resp = self.http.get(url).send().await?;
        decode(resp).await
    }
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
    let status = resp.status();
    let body = resp.bytes().await?;
    debug!(status = status.as_u16(), len = body.len(), "proxy response");
    Ok(serde_json::from_slice(&body)?)
}

impl ChatBackend for ProxyClient {
    async fn send_message(&self, req: &ChatRequest) -> Result<ApiResponse, ClientError> {
        let url = self.endpoint("chat")?;
        debug!(%url, session_id = %req.session_id, "POST chat");
        let resp = self.http.post(url).json(req).send().await?;
        decode(resp).await
    }

    async fn list_sessions(&self) -> Result<SessionsListResponse, ClientError> {
        self.get_sessions(None, false).await
    }

    async fn session_messages(
        &self,
        session_id: &str,
    ) -> Result<SessionMessagesResponse, ClientError> {
        self.get_sessions(Some(session_id), false).await
    }

    async fn delete_session(&self, session_id: &str) -> Result<StatusResponse, ClientError> {
        self.get_sessions(Some(session_id), true).await
    }
}
