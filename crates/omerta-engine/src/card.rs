//! Card identities and the rules knowledge each card type carries.
//!
//! A [`Card`] is immutable once created: a unique id plus a [`CardKind`].
//! The kind determines everything about how the card behaves — targeting
//! requirements, weapon range, whether it opens a reaction window. All of
//! that knowledge lives here as methods on `CardKind` so the action
//! resolver can stay a dispatch table rather than a pile of special cases.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::CardId;

/// Every card type in the game.
///
/// Serialized as SCREAMING_SNAKE tags (`"SHOT"`, `"W_TOMMY"`, ...) to match
/// the wire format the client understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardKind {
    // -- Direct and mass attacks --
    /// Ranged attack; the defender may react with a Dodge.
    #[serde(rename = "SHOT")]
    Shot,
    /// Melee attack at distance 1. No reaction possible.
    #[serde(rename = "KNIFE")]
    Knife,
    /// Thrown attack at distance 1. No reaction possible.
    #[serde(rename = "MOLOTOV")]
    Molotov,
    /// Mass attack: every other living player must discard a Shot
    /// within the reaction window or take 1 damage.
    #[serde(rename = "SHOOTOUT")]
    Shootout,
    /// Mass attack: every other living player must discard a Dodge
    /// within the reaction window or take 1 damage.
    #[serde(rename = "SPRAY")]
    Spray,
    /// Alternating duel: attacker and defender trade Shot discards in
    /// fresh reaction windows until one of them fails.
    #[serde(rename = "VENDETTA")]
    Vendetta,

    // -- Reaction --
    /// Cancels a Shot. Never playable proactively.
    #[serde(rename = "DODGE")]
    Dodge,

    // -- Heals --
    #[serde(rename = "WHISKEY")]
    Whiskey,
    #[serde(rename = "CIGAR")]
    Cigar,

    // -- Control --
    /// Target may lose their next turn (dice check at turn start).
    #[serde(rename = "PRISON")]
    Prison,
    /// Steal a random card or piece of equipment from the target.
    #[serde(rename = "EXTORTION")]
    Extortion,
    /// Destroy a random card or piece of equipment of the target.
    #[serde(rename = "RAID")]
    Raid,

    // -- Weapons --
    #[serde(rename = "W_SAWED")]
    SawedOff,
    #[serde(rename = "W_DOUBLE")]
    DoubleBarrel,
    #[serde(rename = "W_COLT")]
    Colt1911,
    #[serde(rename = "W_TOMMY")]
    TommyGun,
    #[serde(rename = "W_WINCH")]
    Winchester,
    #[serde(rename = "W_SPRING")]
    Springfield,

    // -- Armor --
    /// Reusable armor: a Heart on the dice negates an incoming Shot.
    #[serde(rename = "VEST")]
    Vest,
}

impl CardKind {
    /// Deck composition: how many copies of each kind a fresh deck holds.
    ///
    /// 80 cards in total. This count is fixed for the whole match — the
    /// card-conservation invariant is checked against it in tests.
    pub const COMPOSITION: &'static [(CardKind, usize)] = &[
        (CardKind::Shot, 20),
        (CardKind::Dodge, 12),
        (CardKind::Knife, 6),
        (CardKind::Molotov, 4),
        (CardKind::Shootout, 3),
        (CardKind::Spray, 3),
        (CardKind::Vendetta, 2),
        (CardKind::Whiskey, 5),
        (CardKind::Cigar, 3),
        (CardKind::Prison, 3),
        (CardKind::Extortion, 4),
        (CardKind::Raid, 4),
        (CardKind::SawedOff, 2),
        (CardKind::DoubleBarrel, 2),
        (CardKind::Colt1911, 2),
        (CardKind::TommyGun, 1),
        (CardKind::Winchester, 1),
        (CardKind::Springfield, 1),
        (CardKind::Vest, 2),
    ];

    /// Total number of cards in a fresh deck.
    pub fn deck_size() -> usize {
        Self::COMPOSITION.iter().map(|(_, n)| n).sum()
    }

    /// Weapon range, if this kind is a weapon.
    pub fn weapon_range(self) -> Option<u32> {
        match self {
            CardKind::SawedOff | CardKind::DoubleBarrel => Some(2),
            CardKind::Colt1911 | CardKind::TommyGun => Some(3),
            CardKind::Winchester => Some(4),
            CardKind::Springfield => Some(5),
            _ => None,
        }
    }

    /// Whether this kind is a weapon card.
    pub fn is_weapon(self) -> bool {
        self.weapon_range().is_some()
    }

    /// Whether this weapon lifts the one-Shot-per-turn limit.
    pub fn rapid_fire(self) -> bool {
        matches!(self, CardKind::TommyGun)
    }

    /// Whether this kind heals 1 hp.
    pub fn is_heal(self) -> bool {
        matches!(self, CardKind::Whiskey | CardKind::Cigar)
    }

    /// Whether playing this kind requires a living, non-self target.
    pub fn needs_target(self) -> bool {
        matches!(
            self,
            CardKind::Shot
                | CardKind::Knife
                | CardKind::Molotov
                | CardKind::Vendetta
                | CardKind::Prison
                | CardKind::Extortion
                | CardKind::Raid
        )
    }

    /// Human-readable name used in narrative log lines.
    pub fn display_name(self) -> &'static str {
        match self {
            CardKind::Shot => "Shot",
            CardKind::Knife => "Knife",
            CardKind::Molotov => "Molotov",
            CardKind::Shootout => "Shootout",
            CardKind::Spray => "Tommy Gun Spray",
            CardKind::Vendetta => "Vendetta",
            CardKind::Dodge => "Dodge",
            CardKind::Whiskey => "Whiskey",
            CardKind::Cigar => "Cigar",
            CardKind::Prison => "Prison",
            CardKind::Extortion => "Extortion",
            CardKind::Raid => "Raid",
            CardKind::SawedOff => "Sawed-off",
            CardKind::DoubleBarrel => "Double-barrel",
            CardKind::Colt1911 => "Colt 1911",
            CardKind::TommyGun => "Tommy Gun",
            CardKind::Winchester => "Winchester",
            CardKind::Springfield => "Springfield",
            CardKind::Vest => "Bulletproof Vest",
        }
    }
}

impl fmt::Display for CardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A single card instance. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    #[serde(rename = "type")]
    pub kind: CardKind,
}

impl Card {
    pub fn new(id: CardId, kind: CardKind) -> Self {
        Self { id, kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deck_size_is_eighty() {
        assert_eq!(CardKind::deck_size(), 80);
    }

    #[test]
    fn test_weapon_ranges() {
        assert_eq!(CardKind::SawedOff.weapon_range(), Some(2));
        assert_eq!(CardKind::TommyGun.weapon_range(), Some(3));
        assert_eq!(CardKind::Springfield.weapon_range(), Some(5));
        assert_eq!(CardKind::Shot.weapon_range(), None);
        assert_eq!(CardKind::Vest.weapon_range(), None);
    }

    #[test]
    fn test_only_tommy_gun_is_rapid_fire() {
        for (kind, _) in CardKind::COMPOSITION {
            assert_eq!(kind.rapid_fire(), *kind == CardKind::TommyGun);
        }
    }

    #[test]
    fn test_targeting_requirements() {
        assert!(CardKind::Shot.needs_target());
        assert!(CardKind::Prison.needs_target());
        assert!(CardKind::Vendetta.needs_target());
        // Mass attacks pick their own targets; heals and gear are self-play.
        assert!(!CardKind::Shootout.needs_target());
        assert!(!CardKind::Whiskey.needs_target());
        assert!(!CardKind::Vest.needs_target());
        assert!(!CardKind::TommyGun.needs_target());
    }

    #[test]
    fn test_card_kind_wire_tags() {
        // The client matches on these exact tags — a rename breaks it.
        let json = serde_json::to_string(&CardKind::Shot).unwrap();
        assert_eq!(json, "\"SHOT\"");
        let json = serde_json::to_string(&CardKind::TommyGun).unwrap();
        assert_eq!(json, "\"W_TOMMY\"");
        let json = serde_json::to_string(&CardKind::Vest).unwrap();
        assert_eq!(json, "\"VEST\"");
    }

    #[test]
    fn test_card_serializes_with_type_field() {
        let card = Card::new(CardId(3), CardKind::Dodge);
        let json: serde_json::Value = serde_json::to_value(card).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["type"], "DODGE");
    }
}
