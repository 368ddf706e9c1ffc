//! The view projector: redacted, per-viewer snapshots of a room.
//!
//! There is exactly one canonical [`Game`] record; each viewer's
//! snapshot is derived by a pure projection over it. Redaction rules:
//! the viewer sees their own full seat (hand included); everyone else's
//! hand is reduced to a count, and roles stay hidden until revealed.
//! The pending action is narrowed to what the viewer is allowed to
//! know — chiefly, whether it is *them* being asked to react.

use serde::{Deserialize, Serialize};

use crate::card::{Card, CardKind};
use crate::game::Game;
use crate::ids::PlayerId;
use crate::pending::{MassKind, Pending};
use crate::role::Role;
use crate::seat::Seat;

/// One seat as a given viewer is allowed to see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatView {
    pub id: PlayerId,
    pub name: String,
    pub hp: u32,
    pub max_hp: u32,
    pub dead: bool,
    pub connected: bool,
    pub in_prison: bool,
    pub role_revealed: bool,
    /// `None` while the role is hidden from this viewer.
    pub role: Option<Role>,
    /// `None` for seats other than the viewer's own.
    pub hand: Option<Vec<Card>>,
    pub hand_count: usize,
    /// Equipment is public information.
    pub weapon: Option<Card>,
    pub vest: bool,
}

/// The pending action as a given viewer is allowed to see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PendingView {
    /// A Shot duel. Only reveals whether the viewer must react.
    #[serde(rename = "SHOT", rename_all = "camelCase")]
    Duel { ask_you_to_dodge: bool },

    #[serde(rename = "SHOOTOUT", rename_all = "camelCase")]
    Shootout {
        need: CardKind,
        ends_at: u64,
        you_must_react: bool,
    },

    #[serde(rename = "SPRAY", rename_all = "camelCase")]
    Spray {
        need: CardKind,
        ends_at: u64,
        you_must_react: bool,
    },

    #[serde(rename = "VENDETTA", rename_all = "camelCase")]
    Vendetta {
        attacker_name: String,
        defender_name: String,
        ends_at: u64,
        you_must_react: bool,
    },
}

/// A full per-viewer snapshot, broadcast after every state change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub you: SeatView,
    /// The other seats in seating order (the viewer's seat excluded).
    pub others: Vec<SeatView>,
    pub deck_count: usize,
    pub discard_count: usize,
    pub discard_top: Option<CardKind>,
    pub turn_player_id: Option<PlayerId>,
    pub started: bool,
    pub finished: bool,
    pub round_note: Option<String>,
    pub pending: Option<PendingView>,
}

/// Projects one seat for one viewer.
fn redact_seat(seat: &Seat, is_you: bool) -> SeatView {
    let reveal_role = is_you || seat.role_revealed;
    SeatView {
        id: seat.id,
        name: seat.name.clone(),
        hp: seat.hp,
        max_hp: seat.max_hp,
        dead: seat.dead,
        connected: seat.connected,
        in_prison: seat.in_prison,
        role_revealed: reveal_role,
        role: if reveal_role { seat.role } else { None },
        hand: if is_you { Some(seat.hand.clone()) } else { None },
        hand_count: seat.hand.len(),
        weapon: seat.weapon,
        vest: seat.vest.is_some(),
    }
}

fn redact_pending(game: &Game, viewer: PlayerId) -> Option<PendingView> {
    let pending = game.pending.as_ref()?;
    let view = match pending {
        Pending::Duel { .. } => PendingView::Duel {
            ask_you_to_dodge: pending.awaits(viewer),
        },
        Pending::MassReaction { kind, ends_at_ms, .. } => {
            let need = kind.required();
            let you_must_react = pending.awaits(viewer);
            match kind {
                MassKind::Shootout => PendingView::Shootout {
                    need,
                    ends_at: *ends_at_ms,
                    you_must_react,
                },
                MassKind::Spray => PendingView::Spray {
                    need,
                    ends_at: *ends_at_ms,
                    you_must_react,
                },
            }
        }
        Pending::Vendetta { attacker, defender, ends_at_ms } => {
            PendingView::Vendetta {
                attacker_name: game.seat_name(*attacker),
                defender_name: game.seat_name(*defender),
                ends_at: *ends_at_ms,
                you_must_react: pending.awaits(viewer),
            }
        }
    };
    Some(view)
}

/// Builds the redacted snapshot for one viewer. `None` if the viewer
/// has no seat in this room.
pub(crate) fn snapshot_for(game: &Game, viewer: PlayerId) -> Option<Snapshot> {
    let you = game.seats.iter().find(|s| s.id == viewer)?;
    let others = game
        .seats
        .iter()
        .filter(|s| s.id != viewer)
        .map(|s| redact_seat(s, false))
        .collect();

    Some(Snapshot {
        you: redact_seat(you, true),
        others,
        deck_count: game.deck.draw_count(),
        discard_count: game.deck.discard_count(),
        discard_top: game.deck.discard_top(),
        turn_player_id: game.turn_player_id(),
        started: game.started(),
        finished: game.finished(),
        round_note: game.round_note.clone(),
        pending: redact_pending(game, viewer),
    })
}
