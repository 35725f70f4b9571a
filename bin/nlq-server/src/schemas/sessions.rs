use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

/// Query accepted by `GET /sessions`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SessionsQuery {
    /// Session to read or delete; omitted or empty lists all sessions.
    pub id: Option<String>,
    /// `"true"` deletes the session named by `id`.
    pub delete: Option<String>,
}

impl SessionsQuery {
    pub fn is_delete(&self) -> bool {
        self.delete.as_deref() == Some("true")
    }
}
