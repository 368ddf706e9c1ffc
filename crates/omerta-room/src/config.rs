//! Room configuration.

use omerta_engine::GameConfig;

/// Default command channel size for room actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Configuration for a room instance.
#[derive(Debug, Clone)]
pub struct RoomConfig {
    /// Rules-level settings, passed through to the engine.
    pub game: GameConfig,

    /// Capacity of the actor's command channel. Senders briefly block
    /// when a room falls this far behind.
    pub command_buffer: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            command_buffer: DEFAULT_CHANNEL_SIZE,
        }
    }
}
