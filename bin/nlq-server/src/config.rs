//! Server configuration, loaded from environment variables at startup.

/// Remote chat workflow used when `NLQ_CHAT_WEBHOOK_URL` is unset.
pub const DEFAULT_CHAT_WEBHOOK_URL: &str = "https://n8n-test.iohealth.com/webhook/nlq-v2";

/// Remote sessions workflow used when `NLQ_SESSIONS_WEBHOOK_URL` is unset.
pub const DEFAULT_SESSIONS_WEBHOOK_URL: &str =
    "https://n8n-automation-test.iohealth.com/webhook/nlq-v2/sessions";

/// Runtime configuration for nlq-server.
///
/// Every field has a default, so the server starts with no environment set.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:3000"`).
    pub bind_address: String,

    /// Remote webhook that answers chat messages.
    pub chat_webhook_url: String,

    /// Remote webhook that lists, reads and deletes sessions.
    pub sessions_webhook_url: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Comma-separated list of allowed CORS origins; any origin when unset.
    pub cors_allowed_origins: Option<String>,

    /// Serve `/api-docs/openapi.json`.
    pub enable_openapi: bool,

    /// Timeout for each upstream webhook call. `None` waits indefinitely.
    pub upstream_timeout_secs: Option<u64>,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build [`Config`] from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            bind_address: env_or(&lookup, "NLQ_BIND", "0.0.0.0:3000"),
            chat_webhook_url: env_or(&lookup, "NLQ_CHAT_WEBHOOK_URL", DEFAULT_CHAT_WEBHOOK_URL),
            sessions_webhook_url: env_or(
                &lookup,
                "NLQ_SESSIONS_WEBHOOK_URL",
                DEFAULT_SESSIONS_WEBHOOK_URL,
            ),
            log_level: env_or(&lookup, "NLQ_LOG", "info"),
            log_json: flag(&lookup, "NLQ_LOG_JSON", false),
            cors_allowed_origins: lookup("NLQ_CORS_ORIGINS").filter(|v| !v.trim().is_empty()),
            enable_openapi: flag(&lookup, "NLQ_ENABLE_OPENAPI", true),
            upstream_timeout_secs: lookup("NLQ_UPSTREAM_TIMEOUT_SECS")
                .and_then(|v| v.trim().parse().ok())
                .filter(|secs| *secs > 0),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key).unwrap_or_else(|| default.to_owned())
}

fn flag(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> bool {
    match lookup(key) {
        Some(v) if v == "1" || v.eq_ignore_ascii_case("true") => true,
        Some(v) if v == "0" || v.eq_ignore_ascii_case("false") => false,
        _ => default,
    }
}
