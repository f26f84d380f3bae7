//! Pairing broker server implementation.

mod handler;
mod server;
mod signal;
pub mod state; // UseCase の配線後に外から AppState を組むため public

pub use server::Server;
