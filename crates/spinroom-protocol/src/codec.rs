//! JSON codec for the event surface.
//!
//! Events travel as WebSocket text frames, so the codec works on
//! `String`s rather than byte buffers.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes events to JSON text frames and decodes them back.
///
/// Stateless; `JsonCodec` is a unit struct you can copy freely into
/// handler tasks.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl JsonCodec {
    /// Serializes an event into a text frame.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if serialization fails — which
    /// for our derive-only event types indicates a bug, not bad input.
    pub fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }

    /// Parses a text frame into an event.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] on malformed JSON, an unknown
    /// `type` tag, or missing required fields.
    pub fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T, ProtocolError> {
        serde_json::from_str(text).map_err(ProtocolError::Decode)
    }
}
