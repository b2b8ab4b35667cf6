//! Codec trait and the JSON implementation.
//!
//! The rest of the server never calls `serde_json` directly: it goes
//! through a [`Codec`], so a compact binary format can be swapped in later
//! without touching the handler.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// Encodes values to bytes and decodes them back.
///
/// `Send + Sync + 'static` because one codec instance is shared by every
/// connection task for the lifetime of the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if the value can't be represented.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or don't
    /// match the expected shape.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] backed by `serde_json`.
///
/// JSON is what browser clients speak natively, and it can be read straight
/// out of DevTools while a game is running.
///
/// ```rust
/// use impostor_protocol::{Codec, Envelope, JsonCodec, Request};
///
/// let codec = JsonCodec;
/// let envelope = Envelope::request(1, Request::Roster);
///
/// let bytes = codec.encode(&envelope).unwrap();
/// let decoded: Envelope = codec.decode(&bytes).unwrap();
/// assert_eq!(envelope, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{Envelope, Payload, Request, Token};

    #[test]
    fn test_json_codec_decodes_text_frame_bytes() {
        // Browsers send text frames; the transport hands us their UTF-8
        // bytes unchanged.
        let text = r#"{"seq":2,"payload":{"type":"Request",
            "data":{"type":"Reveal","token":"abc"}}}"#;
        let env: Envelope = JsonCodec.decode(text.as_bytes()).unwrap();

        assert_eq!(
            env.payload,
            Payload::Request(Request::Reveal {
                token: Token::new("abc")
            })
        );
    }

    #[test]
    fn test_json_codec_decode_error_is_decode_variant() {
        let result: Result<Envelope, _> = JsonCodec.decode(b"{\"seq\":");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
