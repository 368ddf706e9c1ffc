//! Room actor: an isolated Tokio task that owns one match.
//!
//! Each room runs in its own task and owns its [`Game`] outright — no
//! locks, no shared mutable state. Connection handlers talk to it
//! through an mpsc command channel; replies come back on oneshot
//! channels. The reaction deadline lives in the same `select!` loop, so
//! timer expiry is serialized with player commands and there is exactly
//! one writer to the match state, ever.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use omerta_engine::{Effect, Game, PlayerId};
use omerta_protocol::{ClientCommand, LobbyPlayer, RoomSummary, ServerMessage};
use tokio::sync::{mpsc, oneshot};

use crate::{Deadline, RoomConfig, RoomError};

/// Channel sender for delivering outbound messages to a player's
/// connection handler.
pub type PlayerSender = mpsc::UnboundedSender<ServerMessage>;

/// Commands sent to a room actor through its channel.
pub(crate) enum RoomCommand {
    /// Seat a player.
    Join {
        player_id: PlayerId,
        name: String,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Detach a player's connection. Replies with whether the room is
    /// now abandoned and should be forgotten.
    Leave {
        player_id: PlayerId,
        reply: oneshot::Sender<bool>,
    },

    /// Deliver a decoded client command from a seated player.
    Command {
        player_id: PlayerId,
        cmd: ClientCommand,
    },
}

/// Handle to a running room actor. Cheap to clone — just a code and an
/// `mpsc::Sender`.
#[derive(Clone)]
pub struct RoomHandle {
    code: String,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// The room's join code (always uppercase).
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Seats a player, waiting for the actor's verdict.
    pub async fn join(
        &self,
        player_id: PlayerId,
        name: String,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Join { player_id, name, sender, reply: reply_tx })
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?
    }

    /// Detaches a player. Returns `true` when the room is abandoned.
    pub async fn leave(&self, player_id: PlayerId) -> Result<bool, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Leave { player_id, reply: reply_tx })
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }

    /// Delivers a client command (fire-and-forget).
    pub async fn command(
        &self,
        player_id: PlayerId,
        cmd: ClientCommand,
    ) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Command { player_id, cmd })
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }
}

/// Spawns a room actor and returns its handle.
pub fn spawn_room(code: String, config: RoomConfig) -> RoomHandle {
    let (tx, rx) = mpsc::channel(config.command_buffer);
    let game = Game::new(config.game.clone());
    let actor = RoomActor {
        code: code.clone(),
        game,
        senders: HashMap::new(),
        deadline: Deadline::new(),
        receiver: rx,
    };
    tokio::spawn(actor.run());
    RoomHandle { code, sender: tx }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    code: String,
    game: Game,
    /// Per-player outbound channels, keyed by seat.
    senders: HashMap<PlayerId, PlayerSender>,
    deadline: Deadline,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    async fn run(mut self) {
        tracing::info!(room = %self.code, "room actor started");

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => {
                    let Some(cmd) = cmd else { break };
                    if self.handle_command(cmd) {
                        break;
                    }
                }
                _ = self.deadline.expired() => {
                    self.deadline.clear();
                    let effects = self.game.deadline_fired();
                    self.apply(effects);
                }
            }
        }

        tracing::info!(room = %self.code, "room actor stopped");
    }

    /// Returns `true` when the actor should shut down.
    fn handle_command(&mut self, cmd: RoomCommand) -> bool {
        match cmd {
            RoomCommand::Join { player_id, name, sender, reply } => {
                let result = self.handle_join(player_id, name, sender);
                let _ = reply.send(result);
                false
            }
            RoomCommand::Leave { player_id, reply } => {
                self.handle_leave(player_id);
                let abandoned = self.senders.is_empty();
                let _ = reply.send(abandoned);
                abandoned
            }
            RoomCommand::Command { player_id, cmd } => {
                self.handle_client(player_id, cmd);
                false
            }
        }
    }

    fn handle_join(
        &mut self,
        player_id: PlayerId,
        name: String,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        let effects = self.game.add_player(player_id, name)?;
        self.senders.insert(player_id, sender);
        self.apply(effects);
        Ok(())
    }

    fn handle_leave(&mut self, player_id: PlayerId) {
        if self.senders.remove(&player_id).is_none() {
            return;
        }
        tracing::info!(
            room = %self.code,
            %player_id,
            remaining = self.senders.len(),
            "player detached"
        );
        let effects = self.game.player_left(player_id);
        self.apply(effects);
    }

    fn handle_client(&mut self, player_id: PlayerId, cmd: ClientCommand) {
        if !self.senders.contains_key(&player_id) {
            tracing::warn!(room = %self.code, %player_id, "command from non-member, ignoring");
            return;
        }

        let effects = match cmd {
            ClientCommand::SetReady { ready } => self.game.set_ready(player_id, ready),
            ClientCommand::Start => match self.game.start(player_id) {
                Ok(effects) => effects,
                Err(e) => {
                    self.notify_error(player_id, e.to_string());
                    return;
                }
            },
            ClientCommand::Play { card_id, target_id } => {
                self.game.play_card(player_id, card_id, target_id)
            }
            ClientCommand::Reaction { choice } => self.game.reaction(player_id, choice),
            ClientCommand::EventReaction { choice } => {
                self.game.event_reaction(player_id, choice)
            }
            ClientCommand::EndTurn => self.game.end_turn(player_id),
            ClientCommand::GetState => {
                self.send_full_state(player_id);
                return;
            }
            // Routing commands are the directory's business; a seated
            // player re-sending one gets a notice, not a new room.
            ClientCommand::Create { .. } | ClientCommand::Join { .. } => {
                self.notify_error(player_id, "already in a room".to_string());
                return;
            }
        };
        self.apply(effects);
    }

    // -----------------------------------------------------------------
    // Effect dispatch
    // -----------------------------------------------------------------

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Narrative(message) => {
                    self.broadcast(&ServerMessage::Narrative { message, at: now_ms() });
                }
                Effect::Dice { player, purpose, symbol } => {
                    let name = self
                        .game
                        .seats()
                        .iter()
                        .find(|s| s.id == player)
                        .map(|s| s.name.clone())
                        .unwrap_or_default();
                    self.broadcast(&ServerMessage::Dice { player, name, purpose, symbol });
                }
                Effect::Roster => self.broadcast_roster(),
                Effect::State => self.broadcast_state(),
                Effect::Reject { player, message } => self.notify_error(player, message),
                Effect::ArmDeadline(window) => self.deadline.arm(window),
                Effect::ClearDeadline => self.deadline.clear(),
            }
        }
    }

    fn summary(&self) -> RoomSummary {
        RoomSummary {
            code: self.code.clone(),
            players: self
                .game
                .seats()
                .iter()
                .map(|s| LobbyPlayer {
                    id: s.id,
                    name: s.name.clone(),
                    ready: s.ready,
                    connected: s.connected,
                    is_host: self.game.host() == Some(s.id),
                })
                .collect(),
            started: self.game.started(),
        }
    }

    fn broadcast(&self, msg: &ServerMessage) {
        for sender in self.senders.values() {
            let _ = sender.send(msg.clone());
        }
    }

    fn broadcast_roster(&self) {
        let room = self.summary();
        for (player_id, sender) in &self.senders {
            let _ = sender.send(ServerMessage::RoomUpdate {
                room: room.clone(),
                you: *player_id,
            });
        }
    }

    /// Snapshots are per-viewer: each recipient gets their own
    /// redaction, never someone else's.
    fn broadcast_state(&self) {
        for (player_id, sender) in &self.senders {
            if let Some(state) = self.game.snapshot_for(*player_id) {
                let _ = sender.send(ServerMessage::StateUpdate { state });
            }
        }
    }

    fn send_full_state(&self, player_id: PlayerId) {
        let Some(sender) = self.senders.get(&player_id) else {
            return;
        };
        let _ = sender.send(ServerMessage::RoomUpdate {
            room: self.summary(),
            you: player_id,
        });
        if let Some(state) = self.game.snapshot_for(player_id) {
            let _ = sender.send(ServerMessage::StateUpdate { state });
        }
    }

    fn notify_error(&self, player_id: PlayerId, message: String) {
        if let Some(sender) = self.senders.get(&player_id) {
            let _ = sender.send(ServerMessage::ErrorNotice { message });
        }
    }
}

/// Wall-clock milliseconds for narrative timestamps.
fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
