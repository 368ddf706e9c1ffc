//! The room directory: creates rooms, resolves join codes, and tracks
//! which player sits where.
//!
//! The directory itself is plain synchronous state — the server layer
//! wraps it in a lock. Room actors are not behind that lock; the
//! directory only hands out cheap [`RoomHandle`] clones.

use std::collections::HashMap;

use omerta_engine::PlayerId;
use rand::Rng;

use crate::room::spawn_room;
use crate::{RoomConfig, RoomError, RoomHandle};

/// Join codes are 4 characters from this alphabet. Ambiguity with
/// lowercase input is handled by uppercasing lookups, not by shrinking
/// the alphabet.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_LEN: usize = 4;

/// All active rooms, and the player → room mapping.
///
/// Invariant: a player is in at most one room at a time.
pub struct RoomDirectory {
    config: RoomConfig,
    rooms: HashMap<String, RoomHandle>,
    player_rooms: HashMap<PlayerId, String>,
}

impl RoomDirectory {
    pub fn new(config: RoomConfig) -> Self {
        Self {
            config,
            rooms: HashMap::new(),
            player_rooms: HashMap::new(),
        }
    }

    /// Spawns a new room under a fresh join code.
    pub fn create_room(&mut self) -> RoomHandle {
        let code = self.fresh_code();
        let handle = spawn_room(code.clone(), self.config.clone());
        self.rooms.insert(code.clone(), handle.clone());
        tracing::info!(room = %code, rooms = self.rooms.len(), "room created");
        handle
    }

    /// Looks up a room by code, case-insensitively.
    pub fn find(&self, code: &str) -> Result<RoomHandle, RoomError> {
        let code = code.trim().to_ascii_uppercase();
        self.rooms
            .get(&code)
            .cloned()
            .ok_or(RoomError::NotFound(code))
    }

    /// The room a player currently sits in, if any.
    pub fn room_of(&self, player: PlayerId) -> Option<RoomHandle> {
        let code = self.player_rooms.get(&player)?;
        self.rooms.get(code).cloned()
    }

    /// Records a player's seating. Fails when they are already seated
    /// somewhere (one room at a time).
    pub fn seat_player(&mut self, player: PlayerId, code: &str) -> Result<(), RoomError> {
        if let Some(current) = self.player_rooms.get(&player) {
            return Err(RoomError::AlreadyInRoom(current.clone()));
        }
        self.player_rooms.insert(player, code.to_string());
        Ok(())
    }

    /// Forgets a player's seating (on disconnect or leave).
    pub fn unseat_player(&mut self, player: PlayerId) {
        self.player_rooms.remove(&player);
    }

    /// Drops an abandoned room's handle. The actor has already stopped
    /// (or stops once the last handle clone goes away).
    pub fn remove_room(&mut self, code: &str) {
        if self.rooms.remove(code).is_some() {
            tracing::info!(room = %code, rooms = self.rooms.len(), "room removed");
        }
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    fn fresh_code(&self) -> String {
        let mut rng = rand::rng();
        loop {
            let code: String = (0..CODE_LEN)
                .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
                .collect();
            if !self.rooms.contains_key(&code) {
                return code;
            }
        }
    }
}

// =====================================================================
// Tests
// =====================================================================
