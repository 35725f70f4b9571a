//! Chat messages: the record the webhook persists and the turn a front end shows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chart::ChartDescriptor;

/// Author tag on a persisted history record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Author {
    User,
    Ai,
    /// Any tag the webhook invents later; replayed as an assistant turn.
    #[serde(other)]
    Other,
}

/// A message record as persisted by the remote service.
///
/// Read-only on our side: history replay converts these into
/// [`DisplayMessage`]s and never writes them back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMessage {
    pub id: String,
    pub author: Author,
    #[serde(default)]
    pub content: String,
    /// Timestamp string exactly as stored remotely.
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub session_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    Text,
    Chart,
}

/// One entry in the active session's message list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_type: Option<ResponseType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_data: Option<ChartDescriptor>,
    /// Commentary attached to a live chart reply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl DisplayMessage {
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    /// Chart payload to draw, if this message should be rendered as a chart.
    pub fn chart(&self) -> Option<&ChartDescriptor> {
        match self.response_type {
            Some(ResponseType::Chart) => self.chart_data.as_ref(),
            _ => None,
        }
    }
}
