//! Request/response shapes owned by the proxy itself.

pub mod chat;
pub mod sessions;
