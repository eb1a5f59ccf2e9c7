//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding events.
///
/// A `ProtocolError` always means a serialization problem — networking
/// and room-state failures live in their own crates' error types.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning an event into a frame).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (malformed JSON, unknown `type` tag,
    /// missing fields, wrong field types).
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),
}
