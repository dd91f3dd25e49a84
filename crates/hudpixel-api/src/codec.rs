//! Codec trait and the JSON implementation.
//!
//! The queue never calls `serde_json` directly. It asks a [`Codec`] to
//! map raw reply elements onto domain representations, so the mapping
//! strategy can be swapped (or instrumented) without touching the queue.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::ApiError;

/// Maps raw JSON onto typed values.
///
/// `Send + Sync + 'static` because one codec instance is shared by every
/// queue entry for the lifetime of the queue, across Tokio worker threads.
pub trait Codec: Send + Sync + 'static {
    /// Decodes one already-parsed reply element, field by field.
    ///
    /// # Errors
    /// Returns [`ApiError::Decode`] if the element doesn't fit `T`
    /// (wrong types, not an object, etc.).
    fn decode_element<T: DeserializeOwned>(
        &self,
        element: &Value,
    ) -> Result<T, ApiError>;

    /// Decodes a whole reply body.
    ///
    /// # Errors
    /// Returns [`ApiError::Decode`] if the bytes aren't valid JSON or
    /// don't fit `T`.
    fn decode_reply<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ApiError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] backed by `serde_json`.
///
/// ## Example
///
/// ```rust
/// use hudpixel_api::{Codec, JsonCodec, Player, PlayerReply};
///
/// let codec = JsonCodec;
/// let reply: PlayerReply = codec
///     .decode_reply(br#"{"success":true,"player":{"displayname":"Notch"}}"#)
///     .unwrap();
///
/// let player: Player = codec.decode_element(reply.player.as_ref().unwrap()).unwrap();
/// assert_eq!(player.displayname, "Notch");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn decode_element<T: DeserializeOwned>(
        &self,
        element: &Value,
    ) -> Result<T, ApiError> {
        // `&Value` is itself a serde Deserializer, so this avoids cloning
        // the element into an owned tree first.
        serde::Deserialize::deserialize(element).map_err(ApiError::Decode)
    }

    fn decode_reply<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ApiError> {
        serde_json::from_slice(data).map_err(ApiError::Decode)
    }
}
