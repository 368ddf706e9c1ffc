//! Room layer for the Omertà server.
//!
//! One actor task per room, owning its match outright; a directory
//! mapping join codes to actors and players to rooms. All engine
//! mutation happens inside the actor — commands and the reaction
//! deadline are serialized by a single `select!` loop.

mod config;
mod deadline;
mod directory;
mod error;
mod room;

pub(crate) use deadline::Deadline;

pub use config::RoomConfig;
pub use directory::RoomDirectory;
pub use error::RoomError;
pub use room::{spawn_room, PlayerSender, RoomHandle};
