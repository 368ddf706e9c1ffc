//! The authoritative match state machine for one room.
//!
//! [`Game`] owns everything that makes up a match: the seating, the
//! deck, the turn pointer, and the single pending-action slot. It is a
//! pure synchronous state machine — no timers, no channels, no I/O.
//! Every operation returns a list of [`Effect`]s describing what the
//! owning room actor should do next: broadcast narrative lines, emit a
//! dice event, re-send per-viewer snapshots, or (re-)arm the one
//! reaction deadline. Timer expiry comes back in through
//! [`Game::deadline_fired`], under the same exclusive access as every
//! other command, so there is nothing to race on.
//!
//! Rule violations inside a running match are not Rust errors. A play
//! that breaks a rule silently returns the card to hand (or produces a
//! [`Effect::Reject`] notice where the rules call for one) and leaves
//! the state untouched.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand::seq::SliceRandom;

use crate::card::{Card, CardKind};
use crate::deck::Deck;
use crate::dice::{DicePurpose, DiceSymbol};
use crate::error::{JoinError, StartError};
use crate::ids::{CardId, PlayerId};
use crate::notes::NotePool;
use crate::pending::{
    EventReactionChoice, MassKind, MassResponse, Pending, ReactionChoice,
};
use crate::role::{Role, role_set};
use crate::seat::Seat;
use crate::view::Snapshot;
use crate::win::{self, Verdict};

/// Match settings. Lives in the engine so the rules and the room layer
/// agree on one source of truth.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub min_players: usize,
    pub max_players: usize,
    /// Length of the timed reaction window for mass attacks and each
    /// vendetta step.
    pub reaction_window: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min_players: 2,
            max_players: 7,
            reaction_window: Duration::from_secs(10),
        }
    }
}

/// The room's match lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Players joining and readying up.
    Lobby,
    /// Turns are running.
    InProgress,
    /// A win condition fired. No further actions are accepted; the
    /// room is kept so players can see the final state.
    Finished,
}

/// A side effect the owning room actor must carry out.
///
/// The engine never talks to the network or the clock itself — it
/// describes what should happen and the actor makes it happen, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Broadcast a narrative log line to every seat.
    Narrative(String),
    /// Broadcast a dice event (prison check or vest save).
    Dice {
        player: PlayerId,
        purpose: DicePurpose,
        symbol: DiceSymbol,
    },
    /// The lobby roster changed — broadcast a fresh room summary.
    Roster,
    /// Match state changed — broadcast fresh per-viewer snapshots.
    State,
    /// Tell one player their command was rejected.
    Reject { player: PlayerId, message: String },
    /// Arm (or replace) the room's reaction deadline.
    ArmDeadline(Duration),
    /// Cancel the reaction deadline. Idempotent.
    ClearDeadline,
}

/// One room's authoritative match state.
pub struct Game {
    pub(crate) config: GameConfig,
    pub(crate) phase: Phase,
    /// Seating order. Fixed once the match starts; dead or disconnected
    /// players keep their seat and are skipped.
    pub(crate) seats: Vec<Seat>,
    pub(crate) host: Option<PlayerId>,
    pub(crate) turn: usize,
    pub(crate) deck: Deck,
    /// The single pending-action slot. While set, no card may be played
    /// and `endTurn` is rejected.
    pub(crate) pending: Option<Pending>,
    pub(crate) round_note: Option<String>,
    notes: NotePool,
    rng: StdRng,
}

impl Game {
    /// Creates an empty lobby with OS-seeded randomness.
    pub fn new(config: GameConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Creates an empty lobby with a fixed seed — deterministic
    /// shuffles and dice for tests.
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, mut rng: StdRng) -> Self {
        let notes = NotePool::new(&mut rng);
        Self {
            config,
            phase: Phase::Lobby,
            seats: Vec::new(),
            host: None,
            turn: 0,
            deck: Deck::empty(),
            pending: None,
            round_note: None,
            notes,
            rng,
        }
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn started(&self) -> bool {
        self.phase != Phase::Lobby
    }

    pub fn finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn host(&self) -> Option<PlayerId> {
        self.host
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    /// Whose turn it is, while the match runs.
    pub fn turn_player_id(&self) -> Option<PlayerId> {
        if self.phase == Phase::InProgress {
            self.seats.get(self.turn).map(|s| s.id)
        } else {
            None
        }
    }

    /// `true` once no connected player remains — the room can be torn
    /// down.
    pub fn is_abandoned(&self) -> bool {
        self.seats.iter().all(|s| !s.connected)
    }

    /// Total cards in play: draw pile, discard, hands, and equipment.
    /// Constant from match start to match end (card conservation).
    pub fn card_total(&self) -> usize {
        self.deck.draw_count()
            + self.deck.discard_count()
            + self.seats.iter().map(Seat::card_count).sum::<usize>()
    }

    /// Builds the redacted snapshot for one viewer.
    pub fn snapshot_for(&self, viewer: PlayerId) -> Option<Snapshot> {
        crate::view::snapshot_for(self, viewer)
    }

    pub(crate) fn seat_name(&self, id: PlayerId) -> String {
        self.seats
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    fn seat_index(&self, id: PlayerId) -> Option<usize> {
        self.seats.iter().position(|s| s.id == id)
    }

    // -----------------------------------------------------------------
    // Lobby
    // -----------------------------------------------------------------

    /// Seats a new player. The first player to join becomes the host.
    pub fn add_player(
        &mut self,
        id: PlayerId,
        name: String,
    ) -> Result<Vec<Effect>, JoinError> {
        if self.phase != Phase::Lobby {
            return Err(JoinError::AlreadyStarted);
        }
        if self.seats.len() >= self.config.max_players {
            return Err(JoinError::RoomFull);
        }
        if self.seat_index(id).is_some() {
            return Err(JoinError::AlreadySeated);
        }

        let name = if name.trim().is_empty() {
            "Nameless".to_string()
        } else {
            name.trim().to_string()
        };
        tracing::info!(player = %id, %name, "player seated");
        self.seats.push(Seat::new(id, name));
        if self.host.is_none() {
            self.host = Some(id);
        }
        Ok(vec![Effect::Roster])
    }

    /// Flags a lobby player as ready (or not).
    pub fn set_ready(&mut self, player: PlayerId, ready: bool) -> Vec<Effect> {
        if self.phase != Phase::Lobby {
            return Vec::new();
        }
        let Some(idx) = self.seat_index(player) else {
            return Vec::new();
        };
        self.seats[idx].ready = ready;
        vec![Effect::Roster]
    }

    /// Handles a player's connection going away.
    ///
    /// Pre-start the seat is removed outright. Post-start the seat
    /// stays (seating order is fixed) and is marked disconnected: their
    /// turns are skipped and any running reaction window treats their
    /// silence as a pass. A Duel has no timer, so a duel waiting on the
    /// leaver is settled immediately as a taken hit rather than
    /// stalling the match forever.
    pub fn player_left(&mut self, player: PlayerId) -> Vec<Effect> {
        let Some(idx) = self.seat_index(player) else {
            return Vec::new();
        };

        if self.phase == Phase::Lobby {
            let seat = self.seats.remove(idx);
            tracing::info!(player = %seat.id, "seat removed from lobby");
            if self.host == Some(player) {
                self.host = self.seats.first().map(|s| s.id);
            }
            return vec![Effect::Roster];
        }

        self.seats[idx].connected = false;
        let name = self.seats[idx].name.clone();
        let mut effects = vec![
            Effect::Narrative(format!("{name} left the table.")),
            Effect::Roster,
        ];

        // A duel blocking on the leaver resolves as a taken hit.
        if let Some(&Pending::Duel { attacker, defender }) = self.pending.as_ref() {
            if defender == player {
                self.pending = None;
                self.apply_damage(
                    defender,
                    1,
                    CardKind::Shot,
                    Some(attacker),
                    &mut effects,
                );
                self.run_win(&mut effects);
            }
        }

        // Don't leave the match stalled on a departed turn-holder.
        if self.phase == Phase::InProgress
            && self.pending.is_none()
            && self.turn_player_id() == Some(player)
        {
            self.advance_turn();
            self.begin_turn(&mut effects);
        }

        effects.push(Effect::State);
        effects
    }

    // -----------------------------------------------------------------
    // Match start
    // -----------------------------------------------------------------

    /// Starts the match. Host only; needs `min_players` seated and
    /// everyone ready.
    pub fn start(&mut self, requester: PlayerId) -> Result<Vec<Effect>, StartError> {
        if self.phase != Phase::Lobby {
            return Err(StartError::AlreadyStarted);
        }
        if Some(requester) != self.host {
            return Err(StartError::NotHost);
        }
        if self.seats.len() < self.config.min_players {
            return Err(StartError::NotEnoughPlayers {
                min: self.config.min_players,
                have: self.seats.len(),
            });
        }
        if !self.seats.iter().all(|s| s.ready) {
            return Err(StartError::NotAllReady);
        }

        self.phase = Phase::InProgress;
        self.deck = Deck::build(&mut self.rng);
        self.pending = None;
        self.round_note = None;

        // Deal roles: the composition is fixed per player count, only
        // the assignment to seats is shuffled. The Don starts revealed.
        let mut roles = role_set(self.seats.len())
            .unwrap_or_else(|| vec![Role::Don, Role::Traitor]);
        roles.shuffle(&mut self.rng);
        for (seat, role) in self.seats.iter_mut().zip(roles) {
            seat.role = Some(role);
            seat.max_hp = role.starting_hp();
            seat.hp = seat.max_hp;
            seat.role_revealed = role == Role::Don;
        }

        // Opening hands: 4 cards each, then the Don opens the match.
        for idx in 0..self.seats.len() {
            let cards = self.deck.draw(4, &mut self.rng);
            self.seats[idx].hand.extend(cards);
        }
        self.turn = self
            .seats
            .iter()
            .position(|s| s.role == Some(Role::Don))
            .unwrap_or(0);

        tracing::info!(players = self.seats.len(), "match started");
        let mut effects = vec![
            Effect::Roster,
            Effect::Narrative("The match begins. The Don opens.".to_string()),
        ];
        self.begin_turn(&mut effects);
        effects.push(Effect::State);
        Ok(effects)
    }

    // -----------------------------------------------------------------
    // Turn engine
    // -----------------------------------------------------------------

    /// Runs start-of-turn for the seat at `self.turn`: shot counters
    /// reset, the Don's continental note, the prison check, and the
    /// draw phase. Skipped turns (failed prison checks) advance and
    /// repeat until someone actually gets to act.
    fn begin_turn(&mut self, effects: &mut Vec<Effect>) {
        // Bounded by the seat count: each pass either breaks or moves
        // the turn pointer past a prisoner whose flag is now cleared.
        for _ in 0..=self.seats.len() {
            for seat in &mut self.seats {
                seat.shots_this_turn = 0;
            }

            let cur = &self.seats[self.turn];
            let (cur_id, cur_name) = (cur.id, cur.name.clone());
            effects.push(Effect::Narrative(format!("It is {cur_name}'s turn.")));

            if cur.role == Some(Role::Don) {
                let note = self.notes.next(&mut self.rng);
                self.round_note = Some(note.to_string());
                effects.push(Effect::Narrative(format!("Continental: {note}")));
            }

            if self.seats[self.turn].in_prison {
                // The prison flag is consumed by the check regardless of
                // the outcome — a failed roll skips exactly one turn.
                self.seats[self.turn].in_prison = false;
                let symbol = DiceSymbol::roll(&mut self.rng);
                effects.push(Effect::Dice {
                    player: cur_id,
                    purpose: DicePurpose::Prison,
                    symbol,
                });
                if symbol == DiceSymbol::Heart {
                    effects.push(Effect::Narrative(format!(
                        "{cur_name} talks their way out of prison."
                    )));
                } else {
                    effects.push(Effect::Narrative(format!(
                        "{cur_name} sits this turn out in prison."
                    )));
                    self.advance_turn();
                    continue;
                }
            }

            let cards = self.deck.draw(2, &mut self.rng);
            self.seats[self.turn].hand.extend(cards);
            return;
        }
    }

    /// Moves the turn pointer to the next living, connected seat.
    /// If no such seat exists the pointer stays put — that state is
    /// terminal and the win evaluator owns it.
    fn advance_turn(&mut self) {
        let len = self.seats.len();
        for step in 1..=len {
            let idx = (self.turn + step) % len;
            if self.seats[idx].alive() && self.seats[idx].connected {
                self.turn = idx;
                return;
            }
        }
    }

    /// Ends the requester's turn. Valid only for the current
    /// turn-holder, with no pending action, while the match runs —
    /// anything else is a silent no-op.
    pub fn end_turn(&mut self, player: PlayerId) -> Vec<Effect> {
        if self.phase != Phase::InProgress
            || self.pending.is_some()
            || self.turn_player_id() != Some(player)
        {
            return Vec::new();
        }

        let mut effects = Vec::new();
        self.advance_turn();
        self.begin_turn(&mut effects);
        effects.push(Effect::State);
        effects
    }

    // -----------------------------------------------------------------
    // Action resolver
    // -----------------------------------------------------------------

    /// Plays a card from the current player's hand.
    ///
    /// Precondition violations (not this player's turn, a pending
    /// action is open, the card isn't in hand) are silent no-ops; the
    /// card never leaves the hand. Per-card rule violations return the
    /// card to hand, with a rejection notice only where the rules call
    /// for one.
    pub fn play_card(
        &mut self,
        player: PlayerId,
        card_id: CardId,
        target: Option<PlayerId>,
    ) -> Vec<Effect> {
        if self.phase != Phase::InProgress
            || self.pending.is_some()
            || self.turn_player_id() != Some(player)
        {
            return Vec::new();
        }

        let actor_idx = self.turn;
        let Some(card) = self.seats[actor_idx].take_card(card_id) else {
            return Vec::new();
        };

        let mut effects = Vec::new();
        let resolved = match card.kind {
            kind if kind.is_weapon() => self.play_weapon(actor_idx, card, &mut effects),
            CardKind::Vest => self.play_vest(actor_idx, card, &mut effects),
            kind if kind.is_heal() => self.play_heal(actor_idx, card, &mut effects),
            CardKind::Prison => self.play_prison(actor_idx, card, target, &mut effects),
            CardKind::Extortion | CardKind::Raid => {
                self.play_loot(actor_idx, card, target, &mut effects)
            }
            CardKind::Shot => self.play_shot(actor_idx, card, target, &mut effects),
            CardKind::Knife | CardKind::Molotov => {
                self.play_melee(actor_idx, card, target, &mut effects)
            }
            CardKind::Shootout | CardKind::Spray => {
                self.play_mass(actor_idx, card, &mut effects)
            }
            CardKind::Vendetta => self.play_vendetta(actor_idx, card, target, &mut effects),
            // Dodge is reaction-only; anything else falls back to hand.
            _ => {
                self.seats[actor_idx].hand.push(card);
                false
            }
        };

        if resolved {
            effects.push(Effect::State);
            self.run_win(&mut effects);
        }
        effects
    }

    /// Validates a living, non-self target. `None` means the play is
    /// invalid and the card should go back to hand.
    fn target_index(&self, actor_idx: usize, target: Option<PlayerId>) -> Option<usize> {
        let target = target?;
        let idx = self.seat_index(target)?;
        if idx == actor_idx || !self.seats[idx].alive() {
            return None;
        }
        Some(idx)
    }

    fn play_weapon(&mut self, actor_idx: usize, card: Card, effects: &mut Vec<Effect>) -> bool {
        // At most one weapon: the old one goes to the discard bag.
        if let Some(old) = self.seats[actor_idx].weapon.take() {
            self.deck.discard(old);
        }
        let name = self.seats[actor_idx].name.clone();
        effects.push(Effect::Narrative(format!(
            "{name} equips a {}.",
            card.kind.display_name()
        )));
        self.seats[actor_idx].weapon = Some(card);
        true
    }

    fn play_vest(&mut self, actor_idx: usize, card: Card, effects: &mut Vec<Effect>) -> bool {
        let seat = &mut self.seats[actor_idx];
        if seat.vest.is_some() {
            // The vest does not stack: rejected, card back to hand.
            let player = seat.id;
            seat.hand.push(card);
            effects.push(Effect::Reject {
                player,
                message: "You are already wearing a vest.".to_string(),
            });
            return false;
        }
        let name = seat.name.clone();
        seat.vest = Some(card);
        effects.push(Effect::Narrative(format!("{name} straps on a vest.")));
        true
    }

    fn play_heal(&mut self, actor_idx: usize, card: Card, effects: &mut Vec<Effect>) -> bool {
        let seat = &mut self.seats[actor_idx];
        let before = seat.hp;
        seat.hp = (seat.hp + 1).min(seat.max_hp);
        if seat.hp > before {
            effects.push(Effect::Narrative(format!(
                "{} enjoys a {} (+1 hp).",
                seat.name,
                card.kind.display_name()
            )));
        }
        // Consumed even at full health.
        self.deck.discard(card);
        true
    }

    fn play_prison(
        &mut self,
        actor_idx: usize,
        card: Card,
        target: Option<PlayerId>,
        effects: &mut Vec<Effect>,
    ) -> bool {
        let Some(target_idx) = self.target_index(actor_idx, target) else {
            self.seats[actor_idx].hand.push(card);
            return false;
        };
        self.seats[target_idx].in_prison = true;
        effects.push(Effect::Narrative(format!(
            "{} has {} thrown in prison.",
            self.seats[actor_idx].name, self.seats[target_idx].name
        )));
        self.deck.discard(card);
        true
    }

    /// EXTORTION and RAID: a uniform pick over the target's hand cards,
    /// weapon, and vest. Extortion transfers (hand card or weapon to
    /// the actor's hand; a vest is destroyed instead), Raid destroys
    /// outright. An empty-handed, bare target still consumes the card.
    fn play_loot(
        &mut self,
        actor_idx: usize,
        card: Card,
        target: Option<PlayerId>,
        effects: &mut Vec<Effect>,
    ) -> bool {
        let Some(target_idx) = self.target_index(actor_idx, target) else {
            self.seats[actor_idx].hand.push(card);
            return false;
        };
        let steals = card.kind == CardKind::Extortion;
        let actor_name = self.seats[actor_idx].name.clone();
        let target_name = self.seats[target_idx].name.clone();
        self.deck.discard(card);

        let hand_len = self.seats[target_idx].hand.len();
        let has_weapon = self.seats[target_idx].weapon.is_some();
        let has_vest = self.seats[target_idx].vest.is_some();
        let pool = hand_len + usize::from(has_weapon) + usize::from(has_vest);
        if pool == 0 {
            effects.push(Effect::Narrative(format!(
                "{actor_name} shakes down {target_name}, but finds nothing."
            )));
            return true;
        }

        let pick = self.rng.random_range(0..pool);
        if pick < hand_len {
            let taken = self.seats[target_idx].hand.remove(pick);
            if steals {
                self.seats[actor_idx].hand.push(taken);
                effects.push(Effect::Narrative(format!(
                    "{actor_name} extorts a card from {target_name}."
                )));
            } else {
                self.deck.discard(taken);
                effects.push(Effect::Narrative(format!(
                    "{actor_name} raids {target_name} and burns a card."
                )));
            }
        } else if pick < hand_len + usize::from(has_weapon) {
            // Unwrap is safe: has_weapon was true for this branch.
            if let Some(weapon) = self.seats[target_idx].weapon.take() {
                if steals {
                    self.seats[actor_idx].hand.push(weapon);
                    effects.push(Effect::Narrative(format!(
                        "{actor_name} walks off with {target_name}'s {}.",
                        weapon.kind.display_name()
                    )));
                } else {
                    effects.push(Effect::Narrative(format!(
                        "{actor_name} destroys {target_name}'s {}.",
                        weapon.kind.display_name()
                    )));
                    self.deck.discard(weapon);
                }
            }
        } else if let Some(vest) = self.seats[target_idx].vest.take() {
            // The vest is destroyed either way — it cannot change owners.
            self.deck.discard(vest);
            effects.push(Effect::Narrative(format!(
                "{target_name}'s vest is torn apart."
            )));
        }
        true
    }

    fn play_shot(
        &mut self,
        actor_idx: usize,
        card: Card,
        target: Option<PlayerId>,
        effects: &mut Vec<Effect>,
    ) -> bool {
        let Some(target_idx) = self.target_index(actor_idx, target) else {
            self.seats[actor_idx].hand.push(card);
            return false;
        };
        if !self.seats[actor_idx].may_shoot() {
            self.seats[actor_idx].hand.push(card);
            return false;
        }
        let range = self.seats[actor_idx].range();
        if self.distance(actor_idx, target_idx) > range {
            self.seats[actor_idx].hand.push(card);
            return false;
        }

        self.seats[actor_idx].shots_this_turn += 1;
        let attacker = self.seats[actor_idx].id;
        let defender = self.seats[target_idx].id;
        let attacker_name = self.seats[actor_idx].name.clone();
        let defender_name = self.seats[target_idx].name.clone();
        self.deck.discard(card);
        effects.push(Effect::Narrative(format!(
            "{attacker_name} fires a Shot at {defender_name}."
        )));

        if self.seats[target_idx].holds_kind(CardKind::Dodge) {
            // The defender can dodge: open a duel and wait for their
            // reaction instead of applying damage now.
            self.pending = Some(Pending::Duel { attacker, defender });
        } else {
            self.apply_damage(defender, 1, CardKind::Shot, Some(attacker), effects);
        }
        true
    }

    fn play_melee(
        &mut self,
        actor_idx: usize,
        card: Card,
        target: Option<PlayerId>,
        effects: &mut Vec<Effect>,
    ) -> bool {
        let Some(target_idx) = self.target_index(actor_idx, target) else {
            self.seats[actor_idx].hand.push(card);
            return false;
        };
        if self.distance(actor_idx, target_idx) > 1 {
            self.seats[actor_idx].hand.push(card);
            return false;
        }

        let attacker = self.seats[actor_idx].id;
        let defender = self.seats[target_idx].id;
        effects.push(Effect::Narrative(format!(
            "{} strikes {} with a {}.",
            self.seats[actor_idx].name,
            self.seats[target_idx].name,
            card.kind.display_name()
        )));
        let kind = card.kind;
        self.deck.discard(card);
        // No reaction to a blade or a bottle; the hit always lands.
        self.apply_damage(defender, 1, kind, Some(attacker), effects);
        true
    }

    fn play_mass(&mut self, actor_idx: usize, card: Card, effects: &mut Vec<Effect>) -> bool {
        let kind = match card.kind {
            CardKind::Shootout => MassKind::Shootout,
            _ => MassKind::Spray,
        };
        let initiator = self.seats[actor_idx].id;
        let responders: Vec<PlayerId> = self
            .seats
            .iter()
            .filter(|s| s.alive() && s.id != initiator)
            .map(|s| s.id)
            .collect();
        let name = self.seats[actor_idx].name.clone();
        self.deck.discard(card);

        effects.push(Effect::Narrative(format!(
            "{name} starts a {}! Discard a {} or take the hit.",
            if kind == MassKind::Shootout { "shootout" } else { "spray of bullets" },
            kind.required().display_name()
        )));
        self.pending = Some(Pending::MassReaction {
            kind,
            initiator,
            responders,
            responses: Default::default(),
            ends_at_ms: self.window_ends_at_ms(),
        });
        effects.push(Effect::ArmDeadline(self.config.reaction_window));
        true
    }

    fn play_vendetta(
        &mut self,
        actor_idx: usize,
        card: Card,
        target: Option<PlayerId>,
        effects: &mut Vec<Effect>,
    ) -> bool {
        let Some(target_idx) = self.target_index(actor_idx, target) else {
            self.seats[actor_idx].hand.push(card);
            return false;
        };
        let attacker = self.seats[actor_idx].id;
        let defender = self.seats[target_idx].id;
        effects.push(Effect::Narrative(format!(
            "{} declares a vendetta against {}!",
            self.seats[actor_idx].name, self.seats[target_idx].name
        )));
        self.deck.discard(card);
        self.pending = Some(Pending::Vendetta {
            attacker,
            defender,
            ends_at_ms: self.window_ends_at_ms(),
        });
        effects.push(Effect::ArmDeadline(self.config.reaction_window));
        true
    }

    // -----------------------------------------------------------------
    // Reactions
    // -----------------------------------------------------------------

    /// Settles a Shot duel. Only the defender's command counts.
    ///
    /// `Dodge` requires actually holding a Dodge card; claiming a dodge
    /// with an empty hand falls through to damage.
    pub fn reaction(&mut self, player: PlayerId, choice: ReactionChoice) -> Vec<Effect> {
        let Some(&Pending::Duel { attacker, defender }) = self.pending.as_ref() else {
            return Vec::new();
        };
        if defender != player {
            return Vec::new();
        }

        let mut effects = Vec::new();
        self.pending = None;

        let dodged = choice == ReactionChoice::Dodge
            && match self.seat_index(defender) {
                Some(idx) => match self.seats[idx].take_kind(CardKind::Dodge) {
                    Some(dodge) => {
                        self.deck.discard(dodge);
                        true
                    }
                    None => false,
                },
                None => false,
            };

        if dodged {
            effects.push(Effect::Narrative(format!(
                "{} dodges the shot.",
                self.seat_name(defender)
            )));
        } else {
            self.apply_damage(defender, 1, CardKind::Shot, Some(attacker), &mut effects);
        }

        self.run_win(&mut effects);
        self.repair_turn(&mut effects);
        effects.push(Effect::State);
        effects
    }

    /// Handles a response inside a timed window (mass reaction or
    /// vendetta step).
    pub fn event_reaction(
        &mut self,
        player: PlayerId,
        choice: EventReactionChoice,
    ) -> Vec<Effect> {
        match &self.pending {
            Some(Pending::MassReaction { .. }) => self.mass_response(player, choice),
            Some(Pending::Vendetta { .. }) => self.vendetta_response(player, choice),
            _ => Vec::new(),
        }
    }

    /// Records one responder's answer. Responses never resolve the
    /// window early — damage is always dealt when the timer fires.
    fn mass_response(&mut self, player: PlayerId, choice: EventReactionChoice) -> Vec<Effect> {
        // Eligibility first: only listed responders answer, and only
        // once. A second answer must not touch the hand.
        let required = match &self.pending {
            Some(Pending::MassReaction { kind, responders, responses, .. })
                if responders.contains(&player) && !responses.contains_key(&player) =>
            {
                kind.required()
            }
            _ => return Vec::new(),
        };
        let Some(idx) = self.seat_index(player) else {
            return Vec::new();
        };

        // A claimed discard with no matching card in hand is a pass.
        let mut effects = Vec::new();
        let response = if choice == EventReactionChoice::Discard {
            match self.seats[idx].take_kind(required) {
                Some(card) => {
                    effects.push(Effect::Narrative(format!(
                        "{} throws down a {}.",
                        self.seats[idx].name,
                        required.display_name()
                    )));
                    self.deck.discard(card);
                    MassResponse::Discarded
                }
                None => MassResponse::Passed,
            }
        } else {
            MassResponse::Passed
        };

        if let Some(Pending::MassReaction { responses, .. }) = &mut self.pending {
            responses.insert(player, response);
        }
        effects.push(Effect::State);
        effects
    }

    /// One vendetta step: a successful Shot discard swaps the roles
    /// under a fresh full window; anything else costs the defender a
    /// hit and closes the action.
    fn vendetta_response(&mut self, player: PlayerId, choice: EventReactionChoice) -> Vec<Effect> {
        let Some(&Pending::Vendetta { attacker, defender, .. }) = self.pending.as_ref()
        else {
            return Vec::new();
        };
        if defender != player {
            return Vec::new();
        }

        let mut effects = Vec::new();
        let discarded = choice == EventReactionChoice::Discard
            && match self.seat_index(defender) {
                Some(idx) => match self.seats[idx].take_kind(CardKind::Shot) {
                    Some(card) => {
                        self.deck.discard(card);
                        true
                    }
                    None => false,
                },
                None => false,
            };

        if discarded {
            // Roles swap; the previous deadline is replaced by a fresh
            // full window for the new defender.
            effects.push(Effect::Narrative(format!(
                "{} returns fire! Now {} must answer.",
                self.seat_name(defender),
                self.seat_name(attacker)
            )));
            self.pending = Some(Pending::Vendetta {
                attacker: defender,
                defender: attacker,
                ends_at_ms: self.window_ends_at_ms(),
            });
            effects.push(Effect::ArmDeadline(self.config.reaction_window));
            effects.push(Effect::State);
        } else {
            effects.push(Effect::Narrative(format!(
                "{} has no answer to the vendetta.",
                self.seat_name(defender)
            )));
            self.pending = None;
            effects.push(Effect::ClearDeadline);
            self.apply_damage(defender, 1, CardKind::Vendetta, Some(attacker), &mut effects);
            self.run_win(&mut effects);
            self.repair_turn(&mut effects);
            effects.push(Effect::State);
        }
        effects
    }

    // -----------------------------------------------------------------
    // Deadline resolution
    // -----------------------------------------------------------------

    /// Resolves the pending action when the room's reaction deadline
    /// fires. A stale fire (nothing pending) is a no-op, which makes
    /// the whole path idempotent.
    pub fn deadline_fired(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        match self.pending.take() {
            None => return effects,

            Some(Pending::MassReaction { kind, initiator, responders, responses, .. }) => {
                effects.push(Effect::Narrative(
                    "The window closes. Dust settles.".to_string(),
                ));
                for responder in responders {
                    // Stop dealing damage once a win condition fired
                    // mid-resolution.
                    if self.phase != Phase::InProgress {
                        break;
                    }
                    if responses.get(&responder) != Some(&MassResponse::Discarded) {
                        self.apply_damage(
                            responder,
                            1,
                            match kind {
                                MassKind::Shootout => CardKind::Shootout,
                                MassKind::Spray => CardKind::Spray,
                            },
                            Some(initiator),
                            &mut effects,
                        );
                        self.run_win(&mut effects);
                    }
                }
                self.repair_turn(&mut effects);
                effects.push(Effect::State);
            }

            Some(Pending::Vendetta { attacker, defender, .. }) => {
                effects.push(Effect::Narrative(format!(
                    "{} freezes. The vendetta is settled.",
                    self.seat_name(defender)
                )));
                self.apply_damage(defender, 1, CardKind::Vendetta, Some(attacker), &mut effects);
                self.run_win(&mut effects);
                self.repair_turn(&mut effects);
                effects.push(Effect::State);
            }

            // A duel never arms the deadline. If one was open anyway,
            // clear it defensively and re-broadcast rather than fail
            // the room.
            Some(Pending::Duel { .. }) => {
                tracing::warn!("deadline fired with a duel pending; clearing");
                effects.push(Effect::State);
            }
        }
        effects
    }

    // -----------------------------------------------------------------
    // Combat resolver
    // -----------------------------------------------------------------

    /// Circular distance between two seats, counted over living seats
    /// only: the minimum of clockwise and counter-clockwise hops.
    fn distance(&self, a_idx: usize, b_idx: usize) -> u32 {
        let living: Vec<usize> = self
            .seats
            .iter()
            .enumerate()
            .filter(|(_, s)| s.alive())
            .map(|(i, _)| i)
            .collect();
        let (Some(a), Some(b)) = (
            living.iter().position(|i| *i == a_idx),
            living.iter().position(|i| *i == b_idx),
        ) else {
            return u32::MAX;
        };
        let len = living.len();
        let forward = (b + len - a) % len;
        let backward = (a + len - b) % len;
        forward.min(backward) as u32
    }

    /// Applies damage, running the vest save for Shots and handling
    /// death. Does not run the win evaluator — callers do, so multi-hit
    /// resolutions control when the match ends.
    fn apply_damage(
        &mut self,
        target: PlayerId,
        amount: u32,
        source_kind: CardKind,
        source: Option<PlayerId>,
        effects: &mut Vec<Effect>,
    ) {
        let Some(idx) = self.seat_index(target) else {
            return;
        };
        if self.seats[idx].dead {
            return;
        }

        // Vest save: only against a Shot, and the vest survives the
        // roll either way — it is reusable armor, not a consumable.
        if source_kind == CardKind::Shot && self.seats[idx].vest.is_some() {
            let symbol = DiceSymbol::roll(&mut self.rng);
            effects.push(Effect::Dice {
                player: target,
                purpose: DicePurpose::Vest,
                symbol,
            });
            if symbol == DiceSymbol::Heart {
                effects.push(Effect::Narrative(format!(
                    "The vest stops the bullet! {} is unharmed.",
                    self.seats[idx].name
                )));
                return;
            }
        }

        self.seats[idx].hp = self.seats[idx].hp.saturating_sub(amount);
        let name = self.seats[idx].name.clone();
        if self.seats[idx].hp == 0 {
            let released = self.seats[idx].die();
            for card in released {
                self.deck.discard(card);
            }
            let role = self.seats[idx]
                .role
                .map(|r| r.to_string())
                .unwrap_or_else(|| "?".to_string());
            tracing::info!(player = %target, %role, "player died");
            effects.push(Effect::Narrative(format!("{name} falls. ({role})")));
        } else {
            let from = source
                .map(|s| format!(" (from {})", self.seat_name(s)))
                .unwrap_or_default();
            effects.push(Effect::Narrative(format!(
                "{name} takes {amount} damage{from}."
            )));
        }
    }

    // -----------------------------------------------------------------
    // Win evaluator hook
    // -----------------------------------------------------------------

    /// Hands the turn onward if the current holder died or left during
    /// a resolution (a swapped vendetta can kill the turn-holder).
    fn repair_turn(&mut self, effects: &mut Vec<Effect>) {
        if self.phase != Phase::InProgress || self.pending.is_some() {
            return;
        }
        let cur = &self.seats[self.turn];
        if cur.alive() && cur.connected {
            return;
        }
        self.advance_turn();
        self.begin_turn(effects);
    }

    /// Runs the win evaluator and finishes the match when a condition
    /// fires. Returns whether the match just ended.
    fn run_win(&mut self, effects: &mut Vec<Effect>) -> bool {
        if self.phase != Phase::InProgress {
            return false;
        }
        let Some(verdict) = win::evaluate(&self.seats) else {
            return false;
        };

        match &verdict {
            Verdict::SoleSurvivor { role, player } => {
                effects.push(Effect::Narrative(format!(
                    "{} stands alone. The {role} wins!",
                    self.seat_name(*player)
                )));
            }
            Verdict::PoliceWin { opportunist } => {
                effects.push(Effect::Narrative(
                    "The Don is dead. The Police win!".to_string(),
                ));
                if let Some(player) = opportunist {
                    effects.push(Effect::Narrative(format!(
                        "{} slips away a winner too.",
                        self.seat_name(*player)
                    )));
                }
            }
            Verdict::MafiaWin { opportunist } => {
                effects.push(Effect::Narrative(
                    "No one left to stand against the family. The Don and Mafia win!"
                        .to_string(),
                ));
                if let Some(player) = opportunist {
                    effects.push(Effect::Narrative(format!(
                        "{} slips away a winner too.",
                        self.seat_name(*player)
                    )));
                }
            }
        }

        tracing::info!(?verdict, "match finished");
        self.phase = Phase::Finished;
        self.pending = None;
        effects.push(Effect::ClearDeadline);
        effects.push(Effect::State);
        true
    }

    /// Advisory wall-clock deadline echoed to clients for timer bars.
    /// The authoritative deadline is the room actor's monotonic timer.
    fn window_ends_at_ms(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO);
        (now + self.config.reaction_window).as_millis() as u64
    }
}

// =====================================================================
// Tests
// =====================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(n: u64) -> PlayerId {
        PlayerId(n)
    }

    fn card(id: u32, kind: CardKind) -> Card {
        Card::new(CardId(1000 + id), kind)
    }

    /// A started match with `n` players, seeded for determinism.
    fn started(n: usize) -> Game {
        let mut game = Game::with_seed(GameConfig::default(), 7);
        for i in 0..n {
            game.add_player(pid(i as u64), format!("p{i}")).unwrap();
            game.set_ready(pid(i as u64), true);
        }
        game.start(pid(0)).unwrap();
        game
    }

    fn idx_of(game: &Game, player: PlayerId) -> usize {
        game.seats.iter().position(|s| s.id == player).unwrap()
    }

    fn role_holder(game: &Game, role: Role) -> PlayerId {
        game.seats.iter().find(|s| s.role == Some(role)).unwrap().id
    }

    /// Hands the turn to `player` with a clean slate and a rigged hand.
    fn rig_turn(game: &mut Game, player: PlayerId, hand: Vec<Card>) {
        let idx = idx_of(game, player);
        game.turn = idx;
        game.pending = None;
        game.seats[idx].shots_this_turn = 0;
        game.seats[idx].hand = hand;
    }

    fn has_narrative(effects: &[Effect], needle: &str) -> bool {
        effects.iter().any(|e| match e {
            Effect::Narrative(text) => text.contains(needle),
            _ => false,
        })
    }

    // ----- lobby -----

    #[test]
    fn test_first_player_becomes_host() {
        let mut game = Game::new(GameConfig::default());
        game.add_player(pid(1), "alpha".into()).unwrap();
        game.add_player(pid(2), "beta".into()).unwrap();
        assert_eq!(game.host(), Some(pid(1)));
    }

    #[test]
    fn test_join_rules_enforced() {
        let mut game = Game::new(GameConfig::default());
        for i in 0..7 {
            game.add_player(pid(i), format!("p{i}")).unwrap();
        }
        assert!(matches!(
            game.add_player(pid(99), "late".into()),
            Err(JoinError::RoomFull)
        ));
        assert!(matches!(
            game.add_player(pid(3), "again".into()),
            Err(JoinError::AlreadySeated)
        ));
    }

    #[test]
    fn test_start_requires_host_and_readiness() {
        let mut game = Game::new(GameConfig::default());
        game.add_player(pid(1), "alpha".into()).unwrap();
        game.add_player(pid(2), "beta".into()).unwrap();
        assert!(matches!(game.start(pid(2)), Err(StartError::NotHost)));
        assert!(matches!(game.start(pid(1)), Err(StartError::NotAllReady)));
        game.set_ready(pid(1), true);
        game.set_ready(pid(2), true);
        assert!(game.start(pid(1)).is_ok());
        assert!(matches!(game.start(pid(1)), Err(StartError::AlreadyStarted)));
    }

    #[test]
    fn test_lobby_leave_removes_seat_and_reassigns_host() {
        let mut game = Game::new(GameConfig::default());
        game.add_player(pid(1), "alpha".into()).unwrap();
        game.add_player(pid(2), "beta".into()).unwrap();
        game.player_left(pid(1));
        assert_eq!(game.seats.len(), 1);
        assert_eq!(game.host(), Some(pid(2)));
    }

    // ----- match start -----

    #[test]
    fn test_start_deals_roles_hands_and_don_opens() {
        let game = started(4);
        assert_eq!(game.phase(), Phase::InProgress);

        let don = role_holder(&game, Role::Don);
        let don_seat = &game.seats[idx_of(&game, don)];
        assert_eq!(don_seat.max_hp, 5);
        assert!(don_seat.role_revealed);
        // Don opened, so they already drew their 2 turn cards.
        assert_eq!(don_seat.hand.len(), 6);
        assert_eq!(game.turn_player_id(), Some(don));
        assert!(game.round_note.is_some());

        for seat in game.seats().iter().filter(|s| s.id != don) {
            assert_eq!(seat.max_hp, 4);
            assert!(!seat.role_revealed);
            assert_eq!(seat.hand.len(), 4);
        }
        assert_eq!(game.card_total(), CardKind::deck_size());
    }

    // ----- guards -----

    #[test]
    fn test_only_turn_holder_may_act() {
        let mut game = started(3);
        let don = role_holder(&game, Role::Don);
        let other = game.seats.iter().find(|s| s.id != don).unwrap().id;
        let other_idx = idx_of(&game, other);
        let card_id = game.seats[other_idx].hand[0].id;

        let effects = game.play_card(other, card_id, None);
        assert!(effects.is_empty());
        assert_eq!(game.seats[other_idx].hand.len(), 4);
        assert!(game.end_turn(other).is_empty());
    }

    #[test]
    fn test_pending_action_blocks_plays_and_end_turn() {
        let mut game = started(3);
        let don = role_holder(&game, Role::Don);
        rig_turn(&mut game, don, vec![card(0, CardKind::Shootout), card(1, CardKind::Cigar)]);

        game.play_card(don, CardId(1000), None);
        assert!(matches!(game.pending, Some(Pending::MassReaction { .. })));

        assert!(game.play_card(don, CardId(1001), None).is_empty());
        assert!(game.end_turn(don).is_empty());
        let don_idx = idx_of(&game, don);
        assert_eq!(game.seats[don_idx].hand.len(), 1);
    }

    // ----- scenario A: melee kill ends the match -----

    #[test]
    fn test_knife_kill_finishes_two_player_match() {
        let mut game = started(2);
        let don = role_holder(&game, Role::Don);
        let traitor = role_holder(&game, Role::Traitor);
        let don_idx = idx_of(&game, don);
        game.seats[don_idx].hp = 1;
        rig_turn(&mut game, traitor, vec![card(0, CardKind::Knife)]);

        let effects = game.play_card(traitor, CardId(1000), Some(don));
        assert!(game.seats[don_idx].dead);
        assert!(game.seats[don_idx].role_revealed);
        assert_eq!(game.phase(), Phase::Finished);
        assert!(has_narrative(&effects, "wins"));
        // Dead seat's cards went back to the discard bag.
        assert_eq!(game.seats[don_idx].hand.len(), 0);
    }

    // ----- scenario B: shot opens a duel, dodge consumes the card -----

    #[test]
    fn test_shot_against_dodge_holder_opens_duel() {
        let mut game = started(3);
        let don = role_holder(&game, Role::Don);
        let target = game.seats.iter().find(|s| s.id != don).unwrap().id;
        let target_idx = idx_of(&game, target);
        rig_turn(&mut game, don, vec![card(0, CardKind::Shot)]);
        game.seats[target_idx].hand = vec![card(1, CardKind::Dodge)];

        game.play_card(don, CardId(1000), Some(target));
        assert!(matches!(
            game.pending,
            Some(Pending::Duel { defender, .. }) if defender == target
        ));
        assert_eq!(game.seats[target_idx].hp, 4);

        // Only the defender sees the dodge prompt.
        let snap = game.snapshot_for(target).unwrap();
        match snap.pending {
            Some(crate::view::PendingView::Duel { ask_you_to_dodge }) => {
                assert!(ask_you_to_dodge)
            }
            other => panic!("unexpected pending view: {other:?}"),
        }

        let effects = game.reaction(target, ReactionChoice::Dodge);
        assert!(has_narrative(&effects, "dodges"));
        assert!(game.pending.is_none());
        assert_eq!(game.seats[target_idx].hp, 4);
        assert!(game.seats[target_idx].hand.is_empty());
    }

    #[test]
    fn test_shot_without_dodge_in_hand_hits_immediately() {
        let mut game = started(3);
        let don = role_holder(&game, Role::Don);
        let target = game.seats.iter().find(|s| s.id != don).unwrap().id;
        let target_idx = idx_of(&game, target);
        rig_turn(&mut game, don, vec![card(0, CardKind::Shot)]);
        game.seats[target_idx].hand.clear();
        game.seats[target_idx].vest = None;

        game.play_card(don, CardId(1000), Some(target));
        assert!(game.pending.is_none());
        assert_eq!(game.seats[target_idx].hp, 3);
    }

    #[test]
    fn test_claimed_dodge_without_the_card_takes_the_hit() {
        let mut game = started(3);
        let don = role_holder(&game, Role::Don);
        let target = game.seats.iter().find(|s| s.id != don).unwrap().id;
        let target_idx = idx_of(&game, target);
        rig_turn(&mut game, don, vec![card(0, CardKind::Shot)]);
        game.seats[target_idx].hand = vec![card(1, CardKind::Dodge)];
        game.seats[target_idx].vest = None;

        game.play_card(don, CardId(1000), Some(target));
        // The dodge vanishes before they answer.
        game.seats[target_idx].hand.clear();
        game.reaction(target, ReactionChoice::Dodge);
        assert_eq!(game.seats[target_idx].hp, 3);
        assert!(game.pending.is_none());
    }

    #[test]
    fn test_one_shot_per_turn_without_rapid_fire() {
        let mut game = started(3);
        let don = role_holder(&game, Role::Don);
        let target = game.seats.iter().find(|s| s.id != don).unwrap().id;
        let target_idx = idx_of(&game, target);
        game.seats[target_idx].hand.clear();
        game.seats[target_idx].vest = None;
        rig_turn(&mut game, don, vec![card(0, CardKind::Shot), card(1, CardKind::Shot)]);

        game.play_card(don, CardId(1000), Some(target));
        assert_eq!(game.seats[target_idx].hp, 3);
        let effects = game.play_card(don, CardId(1001), Some(target));
        assert!(effects.is_empty());
        assert_eq!(game.seats[target_idx].hp, 3);
        let don_idx = idx_of(&game, don);
        assert_eq!(game.seats[don_idx].hand.len(), 1);

        // A Tommy Gun lifts the one-shot limit.
        game.seats[don_idx].weapon = Some(card(2, CardKind::TommyGun));
        game.play_card(don, CardId(1001), Some(target));
        assert_eq!(game.seats[target_idx].hp, 2);
    }

    // ----- scenario C: mass reaction resolves only on the deadline -----

    #[test]
    fn test_shootout_damages_everyone_who_did_not_discard() {
        let mut game = started(4);
        let don = role_holder(&game, Role::Don);
        rig_turn(&mut game, don, vec![card(0, CardKind::Shootout)]);
        let others: Vec<PlayerId> =
            game.seats.iter().map(|s| s.id).filter(|id| *id != don).collect();
        for (i, id) in others.iter().enumerate() {
            let idx = idx_of(&game, *id);
            game.seats[idx].hand.clear();
            game.seats[idx].vest = None;
            game.seats[idx].hp = 4;
            if i == 0 {
                game.seats[idx].hand.push(card(10, CardKind::Shot));
            }
        }

        let effects = game.play_card(don, CardId(1000), None);
        assert!(effects.iter().any(|e| matches!(e, Effect::ArmDeadline(_))));

        // One responder discards; the window does not resolve early.
        game.event_reaction(others[0], EventReactionChoice::Discard);
        assert!(matches!(game.pending, Some(Pending::MassReaction { .. })));
        // A second answer from the same player is ignored.
        assert!(game.event_reaction(others[0], EventReactionChoice::Discard).is_empty());

        game.deadline_fired();
        assert!(game.pending.is_none());
        assert_eq!(game.seats[idx_of(&game, others[0])].hp, 4);
        assert_eq!(game.seats[idx_of(&game, others[1])].hp, 3);
        assert_eq!(game.seats[idx_of(&game, others[2])].hp, 3);
    }

    #[test]
    fn test_stale_deadline_is_a_no_op() {
        let mut game = started(3);
        assert!(game.deadline_fired().is_empty());
    }

    // ----- scenario D: vendetta swap and timeout -----

    #[test]
    fn test_vendetta_swaps_on_shot_discard_then_times_out() {
        let mut game = started(3);
        let don = role_holder(&game, Role::Don);
        let target = game.seats.iter().find(|s| s.id != don).unwrap().id;
        let target_idx = idx_of(&game, target);
        let don_idx = idx_of(&game, don);
        rig_turn(&mut game, don, vec![card(0, CardKind::Vendetta)]);
        game.seats[target_idx].hand = vec![card(1, CardKind::Shot)];
        game.seats[don_idx].vest = None;

        game.play_card(don, CardId(1000), Some(target));
        let effects = game.event_reaction(target, EventReactionChoice::Discard);
        assert!(effects.iter().any(|e| matches!(e, Effect::ArmDeadline(_))));
        assert!(matches!(
            game.pending,
            Some(Pending::Vendetta { defender, .. }) if defender == don
        ));
        assert!(game.seats[target_idx].hand.is_empty());

        // The don has no shot to answer with; the timer settles it.
        game.deadline_fired();
        assert!(game.pending.is_none());
        assert_eq!(game.seats[don_idx].hp, 4);
    }

    #[test]
    fn test_vendetta_pass_costs_a_hit_immediately() {
        let mut game = started(3);
        let don = role_holder(&game, Role::Don);
        let target = game.seats.iter().find(|s| s.id != don).unwrap().id;
        let target_idx = idx_of(&game, target);
        rig_turn(&mut game, don, vec![card(0, CardKind::Vendetta)]);
        game.seats[target_idx].hand.clear();
        game.seats[target_idx].vest = None;

        game.play_card(don, CardId(1000), Some(target));
        let effects = game.event_reaction(target, EventReactionChoice::Pass);
        assert!(effects.iter().any(|e| matches!(e, Effect::ClearDeadline)));
        assert!(game.pending.is_none());
        assert_eq!(game.seats[target_idx].hp, 3);
    }

    // ----- scenario E: equipment rules -----

    #[test]
    fn test_second_weapon_replaces_and_discards_the_first() {
        let mut game = started(3);
        let don = role_holder(&game, Role::Don);
        let don_idx = idx_of(&game, don);
        rig_turn(
            &mut game,
            don,
            vec![card(0, CardKind::SawedOff), card(1, CardKind::Winchester)],
        );

        game.play_card(don, CardId(1000), None);
        assert_eq!(game.seats[don_idx].range(), 2);
        let before_discard = game.deck.discard_count();
        game.play_card(don, CardId(1001), None);
        assert_eq!(game.seats[don_idx].range(), 4);
        assert_eq!(game.deck.discard_count(), before_discard + 1);
    }

    #[test]
    fn test_second_vest_is_rejected_and_returned() {
        let mut game = started(3);
        let don = role_holder(&game, Role::Don);
        let don_idx = idx_of(&game, don);
        rig_turn(&mut game, don, vec![card(0, CardKind::Vest), card(1, CardKind::Vest)]);

        game.play_card(don, CardId(1000), None);
        assert!(game.seats[don_idx].vest.is_some());
        let effects = game.play_card(don, CardId(1001), None);
        assert!(effects.iter().any(|e| matches!(e, Effect::Reject { .. })));
        assert_eq!(game.seats[don_idx].hand.len(), 1);
    }

    // ----- heals, prison, loot -----

    #[test]
    fn test_heal_caps_at_max_and_is_consumed_regardless() {
        let mut game = started(3);
        let don = role_holder(&game, Role::Don);
        let don_idx = idx_of(&game, don);
        rig_turn(&mut game, don, vec![card(0, CardKind::Whiskey), card(1, CardKind::Cigar)]);

        game.seats[don_idx].hp = 3;
        game.play_card(don, CardId(1000), None);
        assert_eq!(game.seats[don_idx].hp, 4);

        game.seats[don_idx].hp = game.seats[don_idx].max_hp;
        let before = game.deck.discard_count();
        game.play_card(don, CardId(1001), None);
        assert_eq!(game.seats[don_idx].hp, game.seats[don_idx].max_hp);
        assert_eq!(game.deck.discard_count(), before + 1);
        assert!(game.seats[don_idx].hand.is_empty());
    }

    #[test]
    fn test_prison_flag_is_consumed_by_the_turn_check() {
        let mut game = started(3);
        let don = role_holder(&game, Role::Don);
        // The next seat after the Don, so its prison check runs on the
        // very next turn change.
        let target_idx = (idx_of(&game, don) + 1) % 3;
        let target = game.seats[target_idx].id;
        rig_turn(&mut game, don, vec![card(0, CardKind::Prison)]);

        game.play_card(don, CardId(1000), Some(target));
        assert!(game.seats[target_idx].in_prison);

        // However the dice land, the flag never survives the check.
        game.end_turn(don);
        assert!(!game.seats[target_idx].in_prison);
        assert_ne!(game.turn_player_id(), Some(don));
    }

    #[test]
    fn test_extortion_on_empty_target_still_consumes_the_card() {
        let mut game = started(3);
        let don = role_holder(&game, Role::Don);
        let target = game.seats.iter().find(|s| s.id != don).unwrap().id;
        let target_idx = idx_of(&game, target);
        rig_turn(&mut game, don, vec![card(0, CardKind::Extortion)]);
        game.seats[target_idx].hand.clear();
        game.seats[target_idx].weapon = None;
        game.seats[target_idx].vest = None;

        let before = game.deck.discard_count();
        let effects = game.play_card(don, CardId(1000), Some(target));
        assert!(has_narrative(&effects, "finds nothing"));
        assert_eq!(game.deck.discard_count(), before + 1);
    }

    #[test]
    fn test_raid_burns_instead_of_transferring() {
        let mut game = started(3);
        let don = role_holder(&game, Role::Don);
        let target = game.seats.iter().find(|s| s.id != don).unwrap().id;
        let target_idx = idx_of(&game, target);
        let don_idx = idx_of(&game, don);
        rig_turn(&mut game, don, vec![card(0, CardKind::Raid)]);
        // Exactly one stealable thing, so the pick is forced.
        game.seats[target_idx].hand = vec![card(1, CardKind::Shot)];
        game.seats[target_idx].weapon = None;
        game.seats[target_idx].vest = None;

        game.play_card(don, CardId(1000), Some(target));
        assert!(game.seats[target_idx].hand.is_empty());
        assert!(game.seats[don_idx].hand.is_empty());
    }

    // ----- disconnects -----

    #[test]
    fn test_mid_match_leave_keeps_seat_and_skips_turns() {
        let mut game = started(3);
        let don = role_holder(&game, Role::Don);
        assert_eq!(game.turn_player_id(), Some(don));

        game.player_left(don);
        assert_eq!(game.seats.len(), 3);
        let don_idx = idx_of(&game, don);
        assert!(!game.seats[don_idx].connected);
        assert_ne!(game.turn_player_id(), Some(don));
        assert_eq!(game.phase(), Phase::InProgress);
    }

    #[test]
    fn test_mass_window_hands_the_turn_on_when_the_initiator_left() {
        let mut game = started(3);
        let don = role_holder(&game, Role::Don);
        rig_turn(&mut game, don, vec![card(0, CardKind::Shootout)]);
        for seat in game.seats.iter_mut().filter(|s| s.id != don) {
            seat.hand.clear();
            seat.vest = None;
        }

        game.play_card(don, CardId(1000), None);
        game.player_left(don);
        assert!(matches!(game.pending, Some(Pending::MassReaction { .. })));

        game.deadline_fired();
        assert!(game.pending.is_none());
        let holder = game.turn_player_id().unwrap();
        assert_ne!(holder, don);
        assert!(game.seats[idx_of(&game, holder)].connected);
        assert!(!game.end_turn(holder).is_empty());
    }

    #[test]
    fn test_duel_settled_after_the_attacker_left_hands_the_turn_on() {
        let mut game = started(3);
        let don = role_holder(&game, Role::Don);
        let target = game.seats.iter().find(|s| s.id != don).unwrap().id;
        let target_idx = idx_of(&game, target);
        rig_turn(&mut game, don, vec![card(0, CardKind::Shot)]);
        game.seats[target_idx].hand = vec![card(1, CardKind::Dodge)];
        game.seats[target_idx].vest = None;

        game.play_card(don, CardId(1000), Some(target));
        game.player_left(don);
        assert!(matches!(game.pending, Some(Pending::Duel { .. })));

        game.reaction(target, ReactionChoice::Dodge);
        assert!(game.pending.is_none());
        assert_ne!(game.turn_player_id(), Some(don));
    }

    #[test]
    fn test_duel_against_a_leaver_settles_as_a_hit() {
        let mut game = started(3);
        let don = role_holder(&game, Role::Don);
        let target = game.seats.iter().find(|s| s.id != don).unwrap().id;
        let target_idx = idx_of(&game, target);
        rig_turn(&mut game, don, vec![card(0, CardKind::Shot)]);
        game.seats[target_idx].hand = vec![card(1, CardKind::Dodge)];
        game.seats[target_idx].vest = None;

        game.play_card(don, CardId(1000), Some(target));
        game.player_left(target);
        assert!(game.pending.is_none());
        assert_eq!(game.seats[target_idx].hp, 3);
    }

    // ----- conservation across a busy sequence -----

    #[test]
    fn test_card_total_stays_constant_through_play() {
        let mut game = started(4);
        let total = game.card_total();
        let don = role_holder(&game, Role::Don);

        // Play whatever the turn-holder actually drew, then pass.
        for _ in 0..8 {
            if game.phase() != Phase::InProgress {
                break;
            }
            let player = game.turn_player_id().unwrap();
            let idx = idx_of(&game, player);
            if let Some(c) = game.seats[idx].hand.first().copied() {
                let target = game
                    .seats
                    .iter()
                    .find(|s| s.alive() && s.id != player)
                    .map(|s| s.id);
                game.play_card(player, c.id, target);
            }
            if let Some(&Pending::Duel { defender, .. }) = game.pending.as_ref() {
                game.reaction(defender, ReactionChoice::TakeHit);
            } else if game.pending.is_some() {
                game.deadline_fired();
            }
            game.end_turn(game.turn_player_id().unwrap_or(don));
            assert_eq!(game.card_total(), total, "conservation violated");
        }
    }
}
