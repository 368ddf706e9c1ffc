//! The six-symbol dice used for chance checks.
//!
//! Two game rules roll the dice: the prison check at turn start, and the
//! vest save when a Shot hits an armored player. In both cases a Heart is
//! the lucky symbol — release from prison, or a negated hit.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One face of the dice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiceSymbol {
    Explosion,
    Patrol,
    Heart,
    Gun,
    Money,
    Joker,
}

impl DiceSymbol {
    const FACES: [DiceSymbol; 6] = [
        DiceSymbol::Explosion,
        DiceSymbol::Patrol,
        DiceSymbol::Heart,
        DiceSymbol::Gun,
        DiceSymbol::Money,
        DiceSymbol::Joker,
    ];

    /// Rolls the dice: a uniform pick over the six faces.
    pub fn roll(rng: &mut impl Rng) -> DiceSymbol {
        Self::FACES[rng.random_range(0..Self::FACES.len())]
    }
}

impl fmt::Display for DiceSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiceSymbol::Explosion => "Explosion",
            DiceSymbol::Patrol => "Patrol",
            DiceSymbol::Heart => "Heart",
            DiceSymbol::Gun => "Gun",
            DiceSymbol::Money => "Money",
            DiceSymbol::Joker => "Joker",
        };
        f.write_str(name)
    }
}

/// Why a dice roll happened. Sent with the roll so clients can label it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DicePurpose {
    /// Turn-start prison check. Heart releases the player.
    Prison,
    /// Vest save against a Shot. Heart negates the hit.
    Vest,
}
