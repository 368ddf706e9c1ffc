//! The pending-action slot: the single in-flight interactive resolution.
//!
//! At most one pending action exists per room at any instant. While it is
//! set, no card may be played and `endTurn` is rejected. The three
//! variants have deliberately divergent protocols, so they are a sum type
//! dispatched explicitly in the reaction handlers — not one flat struct
//! with optional fields.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::card::CardKind;
use crate::ids::PlayerId;

/// Which mass attack opened a [`Pending::MassReaction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MassKind {
    /// Discard a Shot or take 1 damage.
    Shootout,
    /// Discard a Dodge or take 1 damage.
    Spray,
}

impl MassKind {
    /// The card type responders must discard.
    pub fn required(self) -> CardKind {
        match self {
            MassKind::Shootout => CardKind::Shot,
            MassKind::Spray => CardKind::Dodge,
        }
    }
}

/// A responder's recorded answer in a mass reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MassResponse {
    /// Successfully discarded the required card — safe at the deadline.
    Discarded,
    /// Passed, or tried to discard without holding the card.
    Passed,
}

/// The defender's answer to a Shot duel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReactionChoice {
    Dodge,
    TakeHit,
}

/// A responder's answer in a timed window (mass reaction or vendetta).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventReactionChoice {
    Discard,
    Pass,
}

/// The single in-flight interactive resolution for a room.
#[derive(Debug)]
pub enum Pending {
    /// A Shot awaiting the defender's `reaction`. No server timer — the
    /// defender's next command settles it.
    Duel {
        attacker: PlayerId,
        defender: PlayerId,
    },

    /// A timed mass reaction. Responses can arrive early but resolution
    /// always waits for the deadline; anyone not recorded as
    /// `Discarded` when it fires takes 1 damage from the initiator.
    MassReaction {
        kind: MassKind,
        initiator: PlayerId,
        responders: Vec<PlayerId>,
        responses: HashMap<PlayerId, MassResponse>,
        /// Advisory wall-clock deadline echoed to clients for timer
        /// bars. The authoritative deadline is the room actor's timer.
        ends_at_ms: u64,
    },

    /// An alternating duel. Each successful Shot discard swaps the
    /// attacker/defender roles under a fresh full window; any failure
    /// costs the current defender 1 damage.
    Vendetta {
        attacker: PlayerId,
        defender: PlayerId,
        ends_at_ms: u64,
    },
}

impl Pending {
    /// Whether `player` currently owes a response to this action.
    pub fn awaits(&self, player: PlayerId) -> bool {
        match self {
            Pending::Duel { defender, .. } => *defender == player,
            Pending::MassReaction { responders, responses, .. } => {
                responders.contains(&player) && !responses.contains_key(&player)
            }
            Pending::Vendetta { defender, .. } => *defender == player,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mass_kind_required_card() {
        assert_eq!(MassKind::Shootout.required(), CardKind::Shot);
        assert_eq!(MassKind::Spray.required(), CardKind::Dodge);
    }

    #[test]
    fn test_awaits_duel_only_defender() {
        let pending = Pending::Duel {
            attacker: PlayerId(1),
            defender: PlayerId(2),
        };
        assert!(pending.awaits(PlayerId(2)));
        assert!(!pending.awaits(PlayerId(1)));
    }

    #[test]
    fn test_awaits_mass_until_response_recorded() {
        let mut responses = HashMap::new();
        responses.insert(PlayerId(3), MassResponse::Passed);
        let pending = Pending::MassReaction {
            kind: MassKind::Shootout,
            initiator: PlayerId(1),
            responders: vec![PlayerId(2), PlayerId(3)],
            responses,
            ends_at_ms: 0,
        };
        assert!(pending.awaits(PlayerId(2)));
        assert!(!pending.awaits(PlayerId(3)));
        assert!(!pending.awaits(PlayerId(1)));
    }

    #[test]
    fn test_choice_wire_tags() {
        let json = serde_json::to_string(&ReactionChoice::TakeHit).unwrap();
        assert_eq!(json, "\"TAKE_HIT\"");
        let json = serde_json::to_string(&EventReactionChoice::Discard).unwrap();
        assert_eq!(json, "\"DISCARD\"");
    }
}
