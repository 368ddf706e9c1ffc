//! The continental round notes: flavor text revealed at the start of
//! the Don's turn. No rules effect — pure narrative state.

use rand::Rng;
use rand::seq::SliceRandom;

const NOTES: &[&str] = &[
    "The docks are quiet tonight. Too quiet.",
    "A shipment went missing on the river road.",
    "The commissioner was seen dining uptown.",
    "Somebody talked. Nobody knows who. Yet.",
    "The card room above the barbershop is open again.",
    "Two families are feuding over the east market.",
    "A judge's signature sells cheap this week.",
    "Fresh faces at the train station. Out-of-towners.",
    "The distillery doubled its night shift.",
    "An envelope changed hands at the cathedral steps.",
    "The pawnshop is buying guns, no questions asked.",
    "Rain kept the patrols thin on the south side.",
];

/// A shuffled pool of round notes. Pops one per Don turn and reshuffles
/// the full set when exhausted.
#[derive(Debug)]
pub struct NotePool {
    remaining: Vec<&'static str>,
}

impl NotePool {
    pub fn new(rng: &mut impl Rng) -> Self {
        let mut remaining: Vec<&'static str> = NOTES.to_vec();
        remaining.shuffle(rng);
        Self { remaining }
    }

    /// Pops the next note, reshuffling the pool when it runs dry.
    pub fn next(&mut self, rng: &mut impl Rng) -> &'static str {
        if self.remaining.is_empty() {
            self.remaining = NOTES.to_vec();
            self.remaining.shuffle(rng);
        }
        // Non-empty by construction: NOTES is a non-empty constant.
        self.remaining.pop().unwrap_or(NOTES[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_pool_cycles_through_every_note_before_repeating() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut pool = NotePool::new(&mut rng);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..NOTES.len() {
            seen.insert(pool.next(&mut rng));
        }
        assert_eq!(seen.len(), NOTES.len());
        // Keeps producing after exhaustion.
        assert!(!pool.next(&mut rng).is_empty());
    }
}
