//! Wire protocol for the Omertà server.
//!
//! Defines the JSON frames exchanged with clients — [`ClientCommand`]
//! inbound, [`ServerMessage`] outbound — and the [`Codec`] that turns
//! them into websocket text frames. Match state itself lives in
//! `omerta-engine`; this crate only describes how it goes on the wire.

mod codec;
mod command;
mod error;
mod message;

pub use codec::{Codec, JsonCodec};
pub use command::ClientCommand;
pub use error::ProtocolError;
pub use message::{LobbyPlayer, RoomSummary, ServerMessage};
