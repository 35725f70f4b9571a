//! Session list shown next to the chat.

use nlq_types::Session;
use tracing::{info, warn};

use crate::chat::ChatState;
use crate::client::ChatBackend;

pub const LOAD_FAILED: &str = "Failed to load sessions";
pub const DELETE_FAILED: &str = "Failed to delete session";

/// Short human label for a session id, e.g. `Session abc123de...`.
pub fn session_label(session_id: &str) -> String {
    let short: String = session_id.replacen("session_", "", 1).chars().take(8).collect();
    format!("Session {short}...")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Removed remotely; `was_current` means the chat was reset as well.
    Deleted { was_current: bool },
    /// A delete for this id is already in flight.
    Busy,
    Failed,
}

#[derive(Debug, Default)]
pub struct SessionsPanel {
    sessions: Vec<Session>,
    is_loading: bool,
    deleting_id: Option<String>,
    error: Option<String>,
}

impl SessionsPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn deleting_id(&self) -> Option<&str> {
        self.deleting_id.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Reload the list. On failure, including a success envelope without a
    /// list, the previous list stays and [`SessionsPanel::error`] is set.
    pub async fn refresh<B: ChatBackend>(&mut self, backend: &B) {
        self.is_loading = true;
        self.error = None;

        match backend.list_sessions().await {
            Ok(resp) => match resp.sessions() {
                Some(sessions) => {
                    self.sessions = sessions.to_vec();
                    info!(count = self.sessions.len(), "sessions loaded");
                }
                None => {
                    self.error = Some(
                        resp.message
                            .clone()
                            .filter(|m| !m.is_empty())
                            .unwrap_or_else(|| LOAD_FAILED.to_owned()),
                    );
                }
            },
            Err(e) => {
                warn!(error = %e, "error fetching sessions");
                self.error = Some(LOAD_FAILED.to_owned());
            }
        }

        self.is_loading = false;
    }

    /// Delete `session_id` remotely and drop it from the list.
    ///
    /// Deleting the session currently open in `chat` starts a new chat. A
    /// failure is reported only through [`DeleteOutcome::Failed`]; the load
    /// error stays untouched.
    pub async fn delete<B: ChatBackend>(
        &mut self,
        backend: &B,
        session_id: &str,
        chat: &mut ChatState,
    ) -> DeleteOutcome {
        if self.deleting_id.as_deref() == Some(session_id) {
            return DeleteOutcome::Busy;
        }
        self.deleting_id = Some(session_id.to_owned());

        let outcome = match backend.delete_session(session_id).await {
            Ok(resp) if resp.is_success() => {
                self.sessions.retain(|s| s.session_id != session_id);
                let was_current = chat.session_id() == Some(session_id);
                if was_current {
                    chat.new_chat();
                }
                info!(%session_id, was_current, "session deleted");
                DeleteOutcome::Deleted { was_current }
            }
            Ok(resp) => {
                warn!(%session_id, message = ?resp.message, "delete rejected");
                DeleteOutcome::Failed
            }
            Err(e) => {
                warn!(error = %e, %session_id, "error deleting session");
                DeleteOutcome::Failed
            }
        };

        self.deleting_id = None;
        outcome
    }
}
