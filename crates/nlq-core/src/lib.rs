//! Client-side logic for nlq chat.
//!
//! - [`classify`]: text vs. chart sniffing for stored replies
//! - [`message`]: building display messages from history and live replies
//! - [`chart`]: chart projection and numeric coercion
//! - [`client`]: HTTP access to `nlq-server`
//! - [`chat`] / [`sidebar`]: view state driven by a front end

pub mod chart;
pub mod chat;
pub mod classify;
pub mod client;
pub mod message;
pub mod sidebar;

pub use chart::{ChartProjection, project};
pub use chat::{ChatState, generate_session_id};
pub use classify::{Classified, classify};
pub use client::{ChatBackend, ClientError, ProxyClient};
pub use sidebar::{DeleteOutcome, SessionsPanel, session_label};
