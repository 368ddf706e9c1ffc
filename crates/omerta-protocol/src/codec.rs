//! Codec trait and the JSON implementation.
//!
//! The protocol layer doesn't care how frames are serialized — it just
//! needs something implementing [`Codec`]. Omertà's clients speak JSON
//! over websocket text frames, so the codec works with `String` rather
//! than raw bytes; a binary codec would be a different transport
//! decision, not a drop-in here.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// Encodes Rust types to frames and decodes frames back.
///
/// `Send + Sync + 'static` because the codec is shared across the
/// server's connection tasks.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into one text frame.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError>;

    /// Deserializes one text frame back into a value.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the frame is malformed or
    /// doesn't match the expected type.
    fn decode<T: DeserializeOwned>(&self, frame: &str) -> Result<T, ProtocolError>;
}

/// JSON codec — human-readable frames, matched by the browser client.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, frame: &str) -> Result<T, ProtocolError> {
        serde_json::from_str(frame).map_err(ProtocolError::Decode)
    }
}
