//! Error types for the server layer.

use omerta_protocol::ProtocolError;
use omerta_room::RoomError;

/// Errors that can occur accepting or serving connections.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Binding or accepting a TCP connection failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The websocket handshake or framing failed.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// A frame could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room operation failed.
    #[error(transparent)]
    Room(#[from] RoomError),
}
