//! The win evaluator: terminal-condition checks over the seating.
//!
//! Runs after every damage or death event while the match is in
//! progress. Checks are ordered; the first match wins, with the
//! Opportunist's "alive at match end" co-win noted alongside.

use crate::ids::PlayerId;
use crate::role::Role;
use crate::seat::Seat;

/// The outcome of a finished match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Exactly one player survived and their role wins alone
    /// (Traitor, or Opportunist via the sole-survivor condition).
    SoleSurvivor { role: Role, player: PlayerId },

    /// The Don is dead: the Police win. An Opportunist still alive
    /// co-wins — their secondary condition is simply surviving to the
    /// end, independent of who caused it.
    PoliceWin { opportunist: Option<PlayerId> },

    /// No Police and no Traitor remain: the Don and Mafia win, with
    /// the same Opportunist co-win.
    MafiaWin { opportunist: Option<PlayerId> },
}

/// Evaluates the seating for a terminal state. `None` means play on.
pub fn evaluate(seats: &[Seat]) -> Option<Verdict> {
    let living: Vec<&Seat> = seats.iter().filter(|s| s.alive()).collect();
    let living_opportunist = living
        .iter()
        .find(|s| s.role == Some(Role::Opportunist))
        .map(|s| s.id);

    // Sole survivor first: a lone Traitor or Opportunist outranks the
    // faction conditions below.
    if living.len() == 1 {
        let survivor = living[0];
        if let Some(role @ (Role::Traitor | Role::Opportunist)) = survivor.role {
            return Some(Verdict::SoleSurvivor { role, player: survivor.id });
        }
    }

    let don_dead = seats
        .iter()
        .any(|s| s.role == Some(Role::Don) && s.dead);
    if don_dead {
        return Some(Verdict::PoliceWin { opportunist: living_opportunist });
    }

    let threats_remain = living
        .iter()
        .any(|s| matches!(s.role, Some(Role::Police | Role::Traitor)));
    if !threats_remain {
        return Some(Verdict::MafiaWin { opportunist: living_opportunist });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seat(id: u64, role: Role, dead: bool) -> Seat {
        let mut s = Seat::new(PlayerId(id), format!("p{id}"));
        s.role = Some(role);
        s.hp = if dead { 0 } else { role.starting_hp() };
        s.max_hp = role.starting_hp();
        s.dead = dead;
        s
    }

    #[test]
    fn test_match_continues_while_factions_live() {
        let seats = vec![
            seat(1, Role::Don, false),
            seat(2, Role::Mafia, false),
            seat(3, Role::Police, false),
            seat(4, Role::Traitor, false),
        ];
        assert_eq!(evaluate(&seats), None);
    }

    #[test]
    fn test_sole_surviving_traitor_wins() {
        let seats = vec![
            seat(1, Role::Don, true),
            seat(2, Role::Traitor, false),
        ];
        assert_eq!(
            evaluate(&seats),
            Some(Verdict::SoleSurvivor { role: Role::Traitor, player: PlayerId(2) })
        );
    }

    #[test]
    fn test_dead_don_hands_the_win_to_police() {
        let seats = vec![
            seat(1, Role::Don, true),
            seat(2, Role::Mafia, false),
            seat(3, Role::Police, false),
        ];
        assert_eq!(
            evaluate(&seats),
            Some(Verdict::PoliceWin { opportunist: None })
        );
    }

    #[test]
    fn test_opportunist_co_wins_with_police() {
        let seats = vec![
            seat(1, Role::Don, true),
            seat(2, Role::Police, false),
            seat(3, Role::Opportunist, false),
        ];
        assert_eq!(
            evaluate(&seats),
            Some(Verdict::PoliceWin { opportunist: Some(PlayerId(3)) })
        );
    }

    #[test]
    fn test_mafia_wins_when_no_threats_remain() {
        let seats = vec![
            seat(1, Role::Don, false),
            seat(2, Role::Mafia, false),
            seat(3, Role::Police, true),
            seat(4, Role::Traitor, true),
        ];
        assert_eq!(
            evaluate(&seats),
            Some(Verdict::MafiaWin { opportunist: None })
        );
    }

    #[test]
    fn test_sole_surviving_mafia_is_a_mafia_win_not_sole_survivor() {
        // A lone Mafia survivor has no sole-survivor condition; the
        // faction checks decide. Don dead → Police win even though no
        // Police player is alive to enjoy it.
        let seats = vec![
            seat(1, Role::Don, true),
            seat(2, Role::Mafia, false),
            seat(3, Role::Police, true),
        ];
        assert_eq!(
            evaluate(&seats),
            Some(Verdict::PoliceWin { opportunist: None })
        );
    }
}
