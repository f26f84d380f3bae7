//! HTTP / WebSocket endpoint handlers.

mod http;
mod websocket;

pub use http::{get_stats, health_check};
pub use websocket::websocket_handler;

pub(crate) use websocket::notify_match;
