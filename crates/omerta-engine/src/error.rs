//! Error types for the engine.
//!
//! Only lobby-phase operations produce Rust errors. Rule violations
//! inside a running match are not errors — they are silent no-ops or
//! rejection effects, and the room state stays consistent either way.

/// Errors adding a player to a room.
#[derive(Debug, thiserror::Error)]
pub enum JoinError {
    /// The match has already started.
    #[error("the match has already started")]
    AlreadyStarted,

    /// The room is at its player capacity.
    #[error("the room is full")]
    RoomFull,

    /// The player already has a seat in this room.
    #[error("player already seated")]
    AlreadySeated,
}

/// Errors starting a match.
#[derive(Debug, thiserror::Error)]
pub enum StartError {
    /// The match has already started.
    #[error("the match has already started")]
    AlreadyStarted,

    /// Only the host may start the match.
    #[error("only the host can start the match")]
    NotHost,

    /// Fewer players than the minimum.
    #[error("need at least {min} players, have {have}")]
    NotEnoughPlayers { min: usize, have: usize },

    /// Someone has not marked themselves ready.
    #[error("not all players are ready")]
    NotAllReady,
}
