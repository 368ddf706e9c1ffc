//! The per-player mutable record ("seat").
//!
//! Seats live in the room's seating vector, whose order is the circular
//! seating used for distance computation. Once a match starts the vector
//! never changes — dead or disconnected players keep their seat and are
//! merely skipped.

use crate::card::{Card, CardKind};
use crate::ids::{CardId, PlayerId};
use crate::role::Role;

/// One player's seat in a room.
#[derive(Debug)]
pub struct Seat {
    pub id: PlayerId,
    pub name: String,
    pub ready: bool,
    /// Pre-start, a disconnect removes the seat. Post-start the seat
    /// stays and this flag marks the player as gone; their turns are
    /// skipped and pending windows treat their silence as a pass.
    pub connected: bool,
    pub role: Option<Role>,
    pub hp: u32,
    pub max_hp: u32,
    pub hand: Vec<Card>,
    pub dead: bool,
    /// Monotonic: once revealed, a role never hides again.
    pub role_revealed: bool,
    pub in_prison: bool,
    pub weapon: Option<Card>,
    /// The vest is stored as the actual card so it can return to the
    /// discard bag when destroyed (card conservation).
    pub vest: Option<Card>,
    pub shots_this_turn: u32,
}

impl Seat {
    pub fn new(id: PlayerId, name: String) -> Self {
        Self {
            id,
            name,
            ready: false,
            connected: true,
            role: None,
            hp: 0,
            max_hp: 0,
            hand: Vec::new(),
            dead: false,
            role_revealed: false,
            in_prison: false,
            weapon: None,
            vest: None,
            shots_this_turn: 0,
        }
    }

    /// A living player still counted for turns, distance, and win checks.
    pub fn alive(&self) -> bool {
        !self.dead
    }

    /// Effective shooting range: weapon range, or 1 bare-handed.
    pub fn range(&self) -> u32 {
        self.weapon.and_then(|w| w.kind.weapon_range()).unwrap_or(1)
    }

    /// Whether this seat may still play a Shot this turn.
    pub fn may_shoot(&self) -> bool {
        self.shots_this_turn == 0
            || self.weapon.is_some_and(|w| w.kind.rapid_fire())
    }

    /// Removes a card from hand by id.
    pub fn take_card(&mut self, card_id: CardId) -> Option<Card> {
        let idx = self.hand.iter().position(|c| c.id == card_id)?;
        Some(self.hand.remove(idx))
    }

    /// Removes the first card of the given kind from hand.
    pub fn take_kind(&mut self, kind: CardKind) -> Option<Card> {
        let idx = self.hand.iter().position(|c| c.kind == kind)?;
        Some(self.hand.remove(idx))
    }

    pub fn holds_kind(&self, kind: CardKind) -> bool {
        self.hand.iter().any(|c| c.kind == kind)
    }

    /// Marks the seat dead and strips it bare.
    ///
    /// Returns every card the seat was holding (hand, weapon, vest) so
    /// the caller can move them to the discard bag. Death is one-way and
    /// always reveals the role.
    pub fn die(&mut self) -> Vec<Card> {
        self.dead = true;
        self.hp = 0;
        self.role_revealed = true;
        self.in_prison = false;
        let mut released: Vec<Card> = std::mem::take(&mut self.hand);
        if let Some(weapon) = self.weapon.take() {
            released.push(weapon);
        }
        if let Some(vest) = self.vest.take() {
            released.push(vest);
        }
        released
    }

    /// Number of cards this seat holds in total (hand + equipment),
    /// used by the conservation checks.
    pub fn card_count(&self) -> usize {
        self.hand.len()
            + usize::from(self.weapon.is_some())
            + usize::from(self.vest.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seat_with(cards: &[(u32, CardKind)]) -> Seat {
        let mut seat = Seat::new(PlayerId(1), "Vito".into());
        seat.hp = 4;
        seat.max_hp = 4;
        for (id, kind) in cards {
            seat.hand.push(Card::new(CardId(*id), *kind));
        }
        seat
    }

    #[test]
    fn test_range_defaults_to_one() {
        let mut seat = seat_with(&[]);
        assert_eq!(seat.range(), 1);
        seat.weapon = Some(Card::new(CardId(9), CardKind::Winchester));
        assert_eq!(seat.range(), 4);
    }

    #[test]
    fn test_may_shoot_respects_rapid_fire() {
        let mut seat = seat_with(&[]);
        assert!(seat.may_shoot());
        seat.shots_this_turn = 1;
        assert!(!seat.may_shoot());
        seat.weapon = Some(Card::new(CardId(9), CardKind::TommyGun));
        assert!(seat.may_shoot());
    }

    #[test]
    fn test_take_card_by_id() {
        let mut seat = seat_with(&[(1, CardKind::Shot), (2, CardKind::Dodge)]);
        let card = seat.take_card(CardId(2)).unwrap();
        assert_eq!(card.kind, CardKind::Dodge);
        assert_eq!(seat.hand.len(), 1);
        assert!(seat.take_card(CardId(2)).is_none());
    }

    #[test]
    fn test_die_strips_everything_and_returns_the_cards() {
        let mut seat = seat_with(&[(1, CardKind::Shot), (2, CardKind::Whiskey)]);
        seat.weapon = Some(Card::new(CardId(3), CardKind::Colt1911));
        seat.vest = Some(Card::new(CardId(4), CardKind::Vest));
        seat.in_prison = true;

        let released = seat.die();
        assert_eq!(released.len(), 4);
        assert!(seat.dead);
        assert_eq!(seat.hp, 0);
        assert!(seat.role_revealed);
        assert!(!seat.in_prison);
        assert!(seat.hand.is_empty());
        assert!(seat.weapon.is_none());
        assert!(seat.vest.is_none());
        assert_eq!(seat.card_count(), 0);
    }
}
