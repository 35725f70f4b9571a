//! nlq-server – entry point.
//!
//! Startup order:
//! 1. Parse configuration from environment variables.
//! 2. Initialise structured tracing (JSON when `NLQ_LOG_JSON` is set).
//! 3. Build shared state (parsed webhook URLs, outbound HTTP client).
//! 4. Build the Axum router and serve with graceful shutdown.

mod config;
mod error;
mod middleware;
mod routes;
mod schemas;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Configuration ───────────────────────────────────────────────────────
    let cfg = Config::from_env();

    // ── 2. Tracing ─────────────────────────────────────────────────────────────
    init_tracing(&cfg);

    info!(version = env!("CARGO_PKG_VERSION"), "nlq-server starting");

    // ── 3. Shared application state ────────────────────────────────────────────
    let addr: SocketAddr = cfg.bind_address.parse()?;
    let state = Arc::new(AppState::new(cfg)?);
    info!(
        chat = %state.chat_url,
        sessions = %state.sessions_url,
        timeout_secs = ?state.config.upstream_timeout_secs,
        "webhooks configured"
    );
    if state.config.cors_allowed_origins.is_none() {
        warn!("NLQ_CORS_ORIGINS unset; allowing any origin");
    }

    // ── 4. HTTP server with graceful shutdown ──────────────────────────────────
    let app = routes::build(Arc::clone(&state));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("nlq-server stopped");
    Ok(())
}

/// `RUST_LOG` wins over `NLQ_LOG`; an unparsable `NLQ_LOG` falls back to `info`.
fn init_tracing(cfg: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        cfg.log_level.parse::<EnvFilter>().unwrap_or_else(|e| {
            eprintln!("WARN: NLQ_LOG='{}' is not a valid tracing filter ({e}); falling back to 'info'", cfg.log_level);
            EnvFilter::new("info")
        })
    });
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if cfg.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

/// Resolves when SIGINT (Ctrl-C) or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install CTRL+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => warn!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received; starting graceful shutdown");
}
