//! JSON envelopes passed through the proxy.
//!
//! The proxy never rewrites these; they are decoded only by the client side.

use serde::{Deserialize, Serialize};

use crate::chart::ChartDescriptor;
use crate::message::RawMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
    #[serde(other)]
    Unknown,
}

/// `{ "value": ... }` wrapper used for text bodies and chart analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextValue {
    pub value: String,
}

/// Payload of a successful chat reply, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ResponseData {
    Text {
        text: TextValue,
    },
    Chart {
        chart: ChartDescriptor,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        analysis: Option<TextValue>,
    },
    #[serde(other)]
    Unknown,
}

/// Envelope returned by `POST /chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub session_id: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionsData {
    #[serde(default)]
    pub sessions: Option<Vec<Session>>,
}

/// Envelope returned by a bare `GET /sessions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionsListResponse {
    pub status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<SessionsData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionHistory {
    #[serde(default)]
    pub messages: Option<Vec<RawMessage>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryData {
    #[serde(default)]
    pub sessions: Option<SessionHistory>,
}

/// Envelope returned by `GET /sessions?id=...`. Messages are newest-first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMessagesResponse {
    pub status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<HistoryData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Bare status envelope, e.g. the reply to a delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }
}

impl SessionsListResponse {
    /// Session list carried by a success envelope.
    pub fn sessions(&self) -> Option<&[Session]> {
        if self.status != ResponseStatus::Success {
            return None;
        }
        self.data.as_ref()?.sessions.as_deref()
    }
}

impl SessionMessagesResponse {
    /// Raw history carried by a success envelope, newest first.
    pub fn messages(&self) -> Option<&[RawMessage]> {
        if self.status != ResponseStatus::Success {
            return None;
        }
        self.data.as_ref()?.sessions.as_ref()?.messages.as_deref()
    }
}

impl StatusResponse {
    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }
}
