//! Shared application state injected into every Axum handler.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use reqwest::Url;

use crate::config::Config;

/// State shared across all HTTP handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Parsed [`Config::chat_webhook_url`].
    pub chat_url: Url,
    /// Parsed [`Config::sessions_webhook_url`].
    pub sessions_url: Url,
    /// Outbound client; cloned handles share one connection pool.
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let chat_url = Url::parse(&config.chat_webhook_url)
            .with_context(|| format!("invalid NLQ_CHAT_WEBHOOK_URL '{}'", config.chat_webhook_url))?;
        let sessions_url = Url::parse(&config.sessions_webhook_url).with_context(|| {
            format!(
                "invalid NLQ_SESSIONS_WEBHOOK_URL '{}'",
                config.sessions_webhook_url
            )
        })?;

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.upstream_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().context("failed to build HTTP client")?;

        Ok(Self {
            config: Arc::new(config),
            chat_url,
            sessions_url,
            http,
        })
    }
}
