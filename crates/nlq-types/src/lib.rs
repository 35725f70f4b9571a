//! Shared types for the nlq chat workspace.
//!
//! Three groups live here:
//! - [`message`]: persisted history records and the display model built from them.
//! - [`chart`]: chart descriptors as they arrive from the webhook.
//! - [`envelope`]: the JSON envelopes exchanged with the proxy / webhook.

pub mod chart;
pub mod envelope;
pub mod message;

pub use chart::{BarSpec, ChartData, ChartDescriptor, ChartKind, LineSpec};
pub use envelope::{
    ApiResponse, ChatRequest, HistoryData, ResponseData, ResponseStatus, Session,
    SessionHistory, SessionMessagesResponse, SessionsData, SessionsListResponse, StatusResponse,
    TextValue,
};
pub use message::{Author, DisplayMessage, RawMessage, ResponseType, Role};
