//! WebSocket server for Omertà, a hidden-role card duel.
//!
//! Layering: this crate accepts connections and routes frames; the
//! room layer serializes everything through per-room actors; the
//! engine is the single authority on match state. Clients are treated
//! as untrusted — every command is validated where the state lives.

mod error;
mod handler;
mod server;
mod ws;

pub use error::ServerError;
pub use server::{Server, ServerBuilder};
pub use ws::WsListener;
