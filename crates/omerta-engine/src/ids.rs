//! Identity types for players and cards.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A unique identifier for a player.
///
/// This is a newtype wrapper around `u64` — you can't accidentally pass
/// a `CardId` where a `PlayerId` is expected, even though both are plain
/// integers underneath. IDs are minted by the transport layer, one per
/// accepted connection, and stay stable for the life of that connection.
///
/// `#[serde(transparent)]` makes a `PlayerId(42)` serialize as just `42`
/// in JSON, not `{ "0": 42 }` — the client expects a plain number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A unique identifier for a card.
///
/// Card IDs are dense integers minted when a match's deck is built and
/// are unique for the lifetime of that room. Two rooms may use the same
/// numeric IDs — cards never cross room boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub u32);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&PlayerId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_card_id_deserializes_from_plain_number() {
        let cid: CardId = serde_json::from_str("7").unwrap();
        assert_eq!(cid, CardId(7));
    }

    #[test]
    fn test_display_prefixes() {
        assert_eq!(PlayerId(3).to_string(), "P-3");
        assert_eq!(CardId(12).to_string(), "C-12");
    }
}
