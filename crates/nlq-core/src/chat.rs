//! Chat view state.
//!
//! [`ChatState`] is the single owner of the active session id and its message
//! list. Front ends keep one instance and pass it to every handler; nothing
//! here is shared or locked.
//!
//! Every network round trip is split into a `begin_*` step that updates the
//! state and hands out a ticket, and a `complete_*` step that applies the
//! result. Starting a new chat or switching sessions bumps a generation
//! counter, and completions carrying an older generation are dropped, so a
//! late history response can never repopulate a session that is no longer
//! selected. [`ChatState::send`] and [`ChatState::load_session`] chain the two
//! steps for callers that simply await.

use nlq_types::{ApiResponse, ChatRequest, DisplayMessage, SessionMessagesResponse};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::client::{ChatBackend, ClientError};
use crate::message::{self, ERROR_FALLBACK};

/// Generate a fresh session id: `session_` plus 9 hex characters.
pub fn generate_session_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("session_{}", &hex[..9])
}

/// Fence token for one in-flight send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendTicket {
    generation: u64,
    session_id: String,
}

impl SendTicket {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

/// Fence token for one in-flight history load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryTicket {
    generation: u64,
    session_id: String,
}

impl HistoryTicket {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

#[derive(Debug, Default)]
pub struct ChatState {
    session_id: Option<String>,
    messages: Vec<DisplayMessage>,
    is_loading: bool,
    is_loading_history: bool,
    generation: u64,
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume an existing session without loading its history.
    pub fn with_session(session_id: impl Into<String>) -> Self {
        Self {
            session_id: Some(session_id.into()),
            ..Self::default()
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn messages(&self) -> &[DisplayMessage] {
        &self.messages
    }

    /// A send is in flight.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_loading_history(&self) -> bool {
        self.is_loading_history
    }

    /// Whether `input` would be accepted by [`ChatState::begin_send`].
    pub fn can_send(&self, input: &str) -> bool {
        !input.trim().is_empty() && !self.is_loading && !self.is_loading_history
    }

    /// Forget the current session and its messages.
    pub fn new_chat(&mut self) {
        self.generation += 1;
        self.messages.clear();
        self.session_id = None;
        // Any history load in flight is now stale and will never clear this.
        self.is_loading_history = false;
        debug!("started new chat");
    }

    // ── Send ──────────────────────────────────────────────────────────────────

    /// Append the user turn and produce the request to forward.
    ///
    /// Returns `None` (and changes nothing) for blank input or while another
    /// send or a history load is in flight.
    pub fn begin_send(&mut self, input: &str) -> Option<(SendTicket, ChatRequest)> {
        if !self.can_send(input) {
            return None;
        }
        let content = input.trim().to_owned();
        let session_id = self
            .session_id
            .get_or_insert_with(generate_session_id)
            .clone();

        self.messages.push(message::user_message(content.clone()));
        self.is_loading = true;

        let ticket = SendTicket {
            generation: self.generation,
            session_id: session_id.clone(),
        };
        Some((
            ticket,
            ChatRequest {
                session_id,
                message: content,
            },
        ))
    }

    /// Apply the outcome of a send. Returns the appended assistant message,
    /// or `None` when the ticket is stale.
    pub fn complete_send(
        &mut self,
        ticket: SendTicket,
        result: Result<ApiResponse, ClientError>,
    ) -> Option<&DisplayMessage> {
        self.is_loading = false;

        let reply = match result {
            Ok(resp) => message::from_envelope(resp),
            Err(e) => {
                warn!(error = %e, session_id = %ticket.session_id, "error sending message");
                message::error_message(ERROR_FALLBACK)
            }
        };

        if ticket.generation != self.generation {
            debug!(session_id = %ticket.session_id, "dropping reply for a chat no longer shown");
            return None;
        }
        self.messages.push(reply);
        self.messages.last()
    }

    /// Send `input` through `backend` and append the reply.
    pub async fn send<B: ChatBackend>(
        &mut self,
        backend: &B,
        input: &str,
    ) -> Option<&DisplayMessage> {
        let (ticket, req) = self.begin_send(input)?;
        let result = backend.send_message(&req).await;
        self.complete_send(ticket, result)
    }

    // ── History ───────────────────────────────────────────────────────────────

    /// Switch to `session_id`: clear the view and mark history as loading.
    pub fn begin_history_load(&mut self, session_id: impl Into<String>) -> HistoryTicket {
        let session_id = session_id.into();
        self.generation += 1;
        self.is_loading_history = true;
        self.messages.clear();
        self.session_id = Some(session_id.clone());
        HistoryTicket {
            generation: self.generation,
            session_id,
        }
    }

    /// Apply a history response. Returns `false` when the ticket is stale.
    ///
    /// History arrives newest-first and is reversed before display. A failed
    /// or non-success response leaves the view empty.
    pub fn complete_history_load(
        &mut self,
        ticket: HistoryTicket,
        result: Result<SessionMessagesResponse, ClientError>,
    ) -> bool {
        if ticket.generation != self.generation {
            debug!(session_id = %ticket.session_id, "ignoring stale history response");
            return false;
        }
        self.is_loading_history = false;

        match result {
            Ok(resp) => {
                if let Some(raw) = resp.messages() {
                    self.messages = raw.iter().rev().map(message::from_raw).collect();
                    info!(
                        session_id = %ticket.session_id,
                        count = self.messages.len(),
                        "session history loaded"
                    );
                }
            }
            Err(e) => {
                warn!(error = %e, session_id = %ticket.session_id, "error loading session messages");
            }
        }
        true
    }

    /// Switch to `session_id` and load its history through `backend`.
    pub async fn load_session<B: ChatBackend>(&mut self, backend: &B, session_id: &str) {
        let ticket = self.begin_history_load(session_id);
        let result = backend.session_messages(session_id).await;
        self.complete_history_load(ticket, result);
    }
}
