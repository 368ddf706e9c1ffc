//! The draw pile and discard bag, with reshuffle-on-empty.
//!
//! Cards are conserved: everything that leaves play goes to the discard
//! bag, and the bag is the only reshuffle source. The draw pile is a
//! stack (draw from the end); the discard has no ordering guarantee
//! beyond its top card being shown to clients.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::card::{Card, CardKind};
use crate::ids::CardId;

/// Draw pile plus discard bag for one match.
#[derive(Debug)]
pub struct Deck {
    draw: Vec<Card>,
    discard: Vec<Card>,
}

impl Deck {
    /// An empty deck, used before a match is dealt.
    pub fn empty() -> Self {
        Self { draw: Vec::new(), discard: Vec::new() }
    }

    /// Builds a full, shuffled deck with dense card IDs starting at 0.
    pub fn build(rng: &mut impl Rng) -> Self {
        let mut draw = Vec::with_capacity(CardKind::deck_size());
        let mut next_id = 0u32;
        for (kind, count) in CardKind::COMPOSITION {
            for _ in 0..*count {
                draw.push(Card::new(CardId(next_id), *kind));
                next_id += 1;
            }
        }
        draw.shuffle(rng);
        Self { draw, discard: Vec::new() }
    }

    /// Draws up to `n` cards.
    ///
    /// When the draw pile runs out and the discard bag is non-empty, the
    /// bag is shuffled into a fresh pile first. When both are empty the
    /// draw comes up short — fewer cards than requested, never an error.
    pub fn draw(&mut self, n: usize, rng: &mut impl Rng) -> Vec<Card> {
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            if self.draw.is_empty() {
                if self.discard.is_empty() {
                    break;
                }
                self.reshuffle(rng);
            }
            if let Some(card) = self.draw.pop() {
                out.push(card);
            }
        }
        out
    }

    fn reshuffle(&mut self, rng: &mut impl Rng) {
        tracing::debug!(cards = self.discard.len(), "reshuffling discard into deck");
        self.draw = std::mem::take(&mut self.discard);
        self.draw.shuffle(rng);
    }

    /// Puts a card on the discard bag.
    pub fn discard(&mut self, card: Card) {
        self.discard.push(card);
    }

    /// The most recently discarded card's kind, shown to clients.
    pub fn discard_top(&self) -> Option<CardKind> {
        self.discard.last().map(|c| c.kind)
    }

    pub fn draw_count(&self) -> usize {
        self.draw.len()
    }

    pub fn discard_count(&self) -> usize {
        self.discard.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_build_produces_full_deck_with_unique_ids() {
        let mut rng = rng();
        let deck = Deck::build(&mut rng);
        assert_eq!(deck.draw_count(), CardKind::deck_size());
        let ids: HashSet<CardId> = deck.draw.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), CardKind::deck_size());
    }

    #[test]
    fn test_draw_pops_from_the_end() {
        let mut rng = rng();
        let mut deck = Deck::build(&mut rng);
        let top = *deck.draw.last().unwrap();
        let drawn = deck.draw(1, &mut rng);
        assert_eq!(drawn, vec![top]);
        assert_eq!(deck.draw_count(), CardKind::deck_size() - 1);
    }

    #[test]
    fn test_reshuffle_preserves_exactly_the_discarded_cards() {
        let mut rng = rng();
        let mut deck = Deck::build(&mut rng);

        // Drain the pile, discard a known subset, then draw again.
        let drained = deck.draw(CardKind::deck_size(), &mut rng);
        assert_eq!(deck.draw_count(), 0);
        let kept: Vec<Card> = drained[..5].to_vec();
        for card in &kept {
            deck.discard(*card);
        }

        let redrawn = deck.draw(5, &mut rng);
        assert_eq!(redrawn.len(), 5);
        assert_eq!(deck.discard_count(), 0);
        let expected: HashSet<CardId> = kept.iter().map(|c| c.id).collect();
        let got: HashSet<CardId> = redrawn.iter().map(|c| c.id).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn test_draw_comes_up_short_when_everything_is_empty() {
        let mut rng = rng();
        let mut deck = Deck::build(&mut rng);
        let all = deck.draw(CardKind::deck_size() + 10, &mut rng);
        assert_eq!(all.len(), CardKind::deck_size());
        assert!(deck.draw(3, &mut rng).is_empty());
    }

    #[test]
    fn test_discard_top_tracks_latest() {
        let mut rng = rng();
        let mut deck = Deck::build(&mut rng);
        assert_eq!(deck.discard_top(), None);
        deck.discard(Card::new(CardId(1000), CardKind::Whiskey));
        deck.discard(Card::new(CardId(1001), CardKind::Shot));
        assert_eq!(deck.discard_top(), Some(CardKind::Shot));
    }
}
