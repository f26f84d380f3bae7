//! Pairing & signaling broker library.
//!
//! This library implements a WebSocket broker that pairs anonymous clients
//! for one-to-one video/text conversation and relays the WebRTC handshake
//! and chat payloads between matched peers.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// shared library
pub mod common;
