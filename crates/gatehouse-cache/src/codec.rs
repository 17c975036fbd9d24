//! Value codecs for the session cache.
//!
//! A [`Codec`] turns typed values into the bytes a backend stores and back.
//! The round-trip law `decode(encode(x)) == x` must hold for every
//! well-formed value.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{CacheError, CacheResult};

/// Encodes and decodes cache values of type `T`.
pub trait Codec<T>: Send + Sync {
    /// Encode a value into storable bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be represented.
    fn encode(&self, value: &T) -> CacheResult<Vec<u8>>;

    /// Decode bytes produced by [`Codec::encode`].
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a valid encoding of `T`.
    fn decode(&self, bytes: &[u8]) -> CacheResult<T>;
}

/// JSON codec for any serde-serializable value.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl<T> Codec<T> for JsonCodec
where
    T: Serialize + DeserializeOwned,
{
    fn encode(&self, value: &T) -> CacheResult<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| CacheError::encode(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> CacheResult<T> {
        serde_json::from_slice(bytes).map_err(|e| CacheError::decode(e.to_string()))
    }
}

/// Pass-through codec storing strings as their UTF-8 bytes.
///
/// Used for values that are already wire-ready, such as serialized bearer
/// tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringCodec;

impl Codec<String> for StringCodec {
    fn encode(&self, value: &String) -> CacheResult<Vec<u8>> {
        Ok(value.as_bytes().to_vec())
    }

    fn decode(&self, bytes: &[u8]) -> CacheResult<String> {
        String::from_utf8(bytes.to_vec()).map_err(|e| CacheError::decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Session {
        user: String,
        logins: u32,
    }

    #[test]
    fn test_json_round_trip() {
        let codec = JsonCodec;
        let value = Session {
            user: "alice".to_string(),
            logins: 3,
        };

        let bytes = codec.encode(&value).unwrap();
        let decoded: Session = codec.decode(&bytes).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn test_json_decode_rejects_garbage() {
        let codec = JsonCodec;
        let result: CacheResult<Session> = codec.decode(b"not json");
        assert!(matches!(result, Err(CacheError::Decode { .. })));
    }

    #[test]
    fn test_string_round_trip() {
        let codec = StringCodec;
        let value = "header.payload.signature".to_string();

        let bytes = codec.encode(&value).unwrap();
        assert_eq!(bytes, value.as_bytes());
        assert_eq!(codec.decode(&bytes).unwrap(), value);
    }

    #[test]
    fn test_string_decode_rejects_invalid_utf8() {
        let codec = StringCodec;
        let result = codec.decode(&[0xff, 0xfe]);
        assert!(matches!(result, Err(CacheError::Decode { .. })));
    }
}
