//! Error types for the protocol layer.

/// Errors that can occur while turning frames into messages and back.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, a missing field, an
    /// unknown `type` tag, or a negative count.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The frame decoded but makes no sense in context, such as a client
    /// sending a `Response` payload.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
