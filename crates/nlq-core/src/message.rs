//! Builders for [`DisplayMessage`].
//!
//! There are two ingestion routes for the same logical content:
//! - history replay, where a [`RawMessage`] only has a string body and the
//!   classifier decides text vs. chart ([`from_raw`]);
//! - a live reply, where the chat envelope is already tagged
//!   ([`from_response_data`] / [`from_envelope`]).
//!
//! Only the live route carries chart `analysis`; history replay leaves it empty.

use chrono::{DateTime, NaiveDateTime, Utc};
use nlq_types::{
    ApiResponse, Author, DisplayMessage, RawMessage, ResponseData, ResponseType, Role,
};
use tracing::warn;
use uuid::Uuid;

use crate::classify::{classify, Classified};

/// Assistant text shown whenever a send fails without a usable error message.
pub const ERROR_FALLBACK: &str =
    "Sorry, I encountered an error processing your request. Please try again.";

/// Convert a persisted history record into a display message.
pub fn from_raw(raw: &RawMessage) -> DisplayMessage {
    let timestamp = parse_timestamp(&raw.created_at);

    if raw.author == Author::User {
        return DisplayMessage {
            id: raw.id.clone(),
            role: Role::User,
            content: raw.content.clone(),
            response_type: None,
            chart_data: None,
            analysis: None,
            timestamp,
        };
    }

    match classify(&raw.content) {
        Classified::Chart(chart) => DisplayMessage {
            id: raw.id.clone(),
            role: Role::Assistant,
            content: String::new(),
            response_type: Some(ResponseType::Chart),
            chart_data: Some(chart),
            analysis: None,
            timestamp,
        },
        Classified::Text(text) => DisplayMessage {
            id: raw.id.clone(),
            role: Role::Assistant,
            content: if text.is_empty() { raw.content.clone() } else { text },
            response_type: Some(ResponseType::Text),
            chart_data: None,
            analysis: None,
            timestamp,
        },
    }
}

/// Build the assistant message for a successful live reply.
pub fn from_response_data(data: ResponseData) -> DisplayMessage {
    let mut msg = assistant(String::new(), None);
    match data {
        ResponseData::Text { text } => {
            msg.content = text.value;
            msg.response_type = Some(ResponseType::Text);
        }
        ResponseData::Chart { chart, analysis } => {
            let analysis = analysis.map(|a| a.value);
            msg.content = analysis.clone().unwrap_or_default();
            msg.response_type = Some(ResponseType::Chart);
            msg.chart_data = Some(chart);
            msg.analysis = analysis;
        }
        ResponseData::Unknown => {}
    }
    msg
}

/// Build the assistant message for any decoded chat envelope.
///
/// Non-success envelopes become a text message with the envelope's own
/// message, or [`ERROR_FALLBACK`] when it has none.
pub fn from_envelope(resp: ApiResponse) -> DisplayMessage {
    let success = resp.is_success();
    match resp.data {
        Some(data) if success => from_response_data(data),
        _ => {
            let content = resp
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| ERROR_FALLBACK.to_owned());
            error_message(content)
        }
    }
}

/// A freshly typed user turn.
pub fn user_message(content: impl Into<String>) -> DisplayMessage {
    DisplayMessage {
        id: Uuid::new_v4().to_string(),
        role: Role::User,
        content: content.into(),
        response_type: None,
        chart_data: None,
        analysis: None,
        timestamp: Utc::now(),
    }
}

/// An assistant text turn reporting a failure.
pub fn error_message(content: impl Into<String>) -> DisplayMessage {
    assistant(content.into(), Some(ResponseType::Text))
}

fn assistant(content: String, response_type: Option<ResponseType>) -> DisplayMessage {
    DisplayMessage {
        id: Uuid::new_v4().to_string(),
        role: Role::Assistant,
        content,
        response_type,
        chart_data: None,
        analysis: None,
        timestamp: Utc::now(),
    }
}

/// Parse a remote timestamp.
///
/// Accepts RFC 3339 and the zone-less `YYYY-MM-DD[T ]HH:MM:SS[.fff]` forms
/// (read as UTC). Anything else is logged and replaced with the current time.
pub fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return ts.with_timezone(&Utc);
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return naive.and_utc();
        }
    }
    warn!(created_at = %raw, "unparseable message timestamp; using current time");
    Utc::now()
}
