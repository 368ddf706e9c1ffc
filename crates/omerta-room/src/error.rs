//! Error types for the room layer.

use omerta_engine::JoinError;

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// No room with this code exists.
    #[error("room {0} not found")]
    NotFound(String),

    /// The engine refused the join (full, started, or duplicate seat).
    #[error(transparent)]
    Join(#[from] JoinError),

    /// The player is already in a room and must leave it first.
    #[error("already in room {0}")]
    AlreadyInRoom(String),

    /// The room's actor is gone or its channel is closed.
    #[error("room {0} is unavailable")]
    Unavailable(String),
}
