//! Hidden roles and the per-player-count role composition.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The hidden role a player is dealt at match start.
///
/// The Don is always revealed immediately; every other role stays hidden
/// until the player dies (or a win condition makes it self-evident).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// The boss. Revealed from the start, 5 hp instead of 4.
    Don,
    /// Wins alongside the Don.
    Mafia,
    /// Wins when the Don dies.
    Police,
    /// Wins only as the sole survivor.
    Traitor,
    /// Wins as sole survivor, and co-wins whenever the match ends
    /// while they are still alive.
    Opportunist,
}

impl Role {
    /// Starting (and maximum) hit points for this role.
    pub fn starting_hp(self) -> u32 {
        match self {
            Role::Don => 5,
            _ => 4,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Don => "Don",
            Role::Mafia => "Mafia",
            Role::Police => "Police",
            Role::Traitor => "Traitor",
            Role::Opportunist => "Opportunist",
        };
        f.write_str(name)
    }
}

/// The role set dealt for a given player count.
///
/// Returns `None` outside the supported 2–7 range. The composition is
/// fixed; only the assignment of roles to seats is random.
pub fn role_set(players: usize) -> Option<Vec<Role>> {
    use Role::*;
    let set = match players {
        2 => vec![Don, Traitor],
        3 => vec![Don, Mafia, Police],
        4 => vec![Don, Mafia, Police, Traitor],
        5 => vec![Don, Mafia, Mafia, Police, Police],
        6 => vec![Don, Mafia, Mafia, Police, Police, Traitor],
        7 => vec![Don, Mafia, Mafia, Police, Police, Traitor, Opportunist],
        _ => return None,
    };
    Some(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_set_sizes_match_player_count() {
        for n in 2..=7 {
            assert_eq!(role_set(n).unwrap().len(), n);
        }
        assert!(role_set(1).is_none());
        assert!(role_set(8).is_none());
    }

    #[test]
    fn test_every_set_has_exactly_one_don() {
        for n in 2..=7 {
            let dons = role_set(n)
                .unwrap()
                .iter()
                .filter(|r| **r == Role::Don)
                .count();
            assert_eq!(dons, 1, "player count {n}");
        }
    }

    #[test]
    fn test_opportunist_only_at_seven() {
        for n in 2..=6 {
            assert!(!role_set(n).unwrap().contains(&Role::Opportunist));
        }
        assert!(role_set(7).unwrap().contains(&Role::Opportunist));
    }

    #[test]
    fn test_don_has_five_hp_others_four() {
        assert_eq!(Role::Don.starting_hp(), 5);
        assert_eq!(Role::Mafia.starting_hp(), 4);
        assert_eq!(Role::Police.starting_hp(), 4);
        assert_eq!(Role::Traitor.starting_hp(), 4);
        assert_eq!(Role::Opportunist.starting_hp(), 4);
    }
}
