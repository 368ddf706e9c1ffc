//! Authoritative rules engine for Omertà, a hidden-role card duel.
//!
//! This crate is pure game logic: no sockets, no timers, no async.
//! [`Game`] is the single source of truth for one room's match, and
//! every operation on it returns [`Effect`]s telling the owning room
//! actor what to broadcast and whether to arm the reaction deadline.
//! Clients never see this state directly — [`Game::snapshot_for`]
//! produces the per-viewer redacted projection that goes on the wire.

mod card;
mod deck;
mod dice;
mod error;
mod game;
mod ids;
mod notes;
mod pending;
mod role;
mod seat;
mod view;
mod win;

pub use card::{Card, CardKind};
pub use dice::{DicePurpose, DiceSymbol};
pub use error::{JoinError, StartError};
pub use game::{Effect, Game, GameConfig, Phase};
pub use ids::{CardId, PlayerId};
pub use pending::{EventReactionChoice, MassKind, ReactionChoice};
pub use role::Role;
pub use seat::Seat;
pub use view::{PendingView, SeatView, Snapshot};
pub use win::Verdict;
