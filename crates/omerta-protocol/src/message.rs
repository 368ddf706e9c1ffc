//! Server-to-client messages.
//!
//! The server pushes five kinds of frames: lobby roster updates,
//! per-viewer match snapshots, narrative log lines, dice events, and
//! error notices. Like commands, each is one JSON object tagged by
//! `type` with camelCase fields.
//!
//! Snapshots are already redacted by the engine before they reach this
//! layer — a `stateUpdate` only ever carries what its recipient is
//! allowed to see.

use serde::{Deserialize, Serialize};

use omerta_engine::{DicePurpose, DiceSymbol, PlayerId, Snapshot};

/// One player's row in the lobby roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyPlayer {
    pub id: PlayerId,
    pub name: String,
    pub ready: bool,
    pub connected: bool,
    pub is_host: bool,
}

/// The lobby-level view of a room, broadcast on every roster change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    /// The join code, always uppercase.
    pub code: String,
    pub players: Vec<LobbyPlayer>,
    pub started: bool,
}

/// A message pushed by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Roster change: someone joined, left, readied, or the match
    /// started. `you` echoes the recipient's own id so a fresh client
    /// can find itself in the list.
    #[serde(rename_all = "camelCase")]
    RoomUpdate { room: RoomSummary, you: PlayerId },

    /// A redacted match snapshot for this recipient.
    StateUpdate { state: Snapshot },

    /// One line of the shared match log.
    #[serde(rename_all = "camelCase")]
    Narrative { message: String, at: u64 },

    /// A public dice roll (prison check or vest save).
    #[serde(rename_all = "camelCase")]
    Dice {
        player: PlayerId,
        name: String,
        purpose: DicePurpose,
        symbol: DiceSymbol,
    },

    /// The recipient's last command was rejected.
    #[serde(rename_all = "camelCase")]
    ErrorNotice { message: String },
}

// =====================================================================
// Tests
// =====================================================================
