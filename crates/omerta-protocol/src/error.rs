//! Error types for the protocol layer.
//!
//! Each crate defines its own error enum, so a `ProtocolError` always
//! means a serialization problem, never a networking or room problem.

/// Errors that can occur encoding or decoding wire messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into a frame).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed. Common causes: malformed JSON, a
    /// missing field, or an unknown `type` tag.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),
}
