//! MessagePusher 実装

pub mod websocket;

pub use websocket::WebSocketMessagePusher;
