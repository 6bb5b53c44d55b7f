// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The serialization codec capability.
//!
//! The store holds strings; the codec turns domain values into storable
//! strings and back. The built-in [`JsonCodec`] uses serde_json.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Encoding or decoding a cached value failed.
#[derive(Debug, thiserror::Error)]
#[error("codec failure: {0}")]
pub struct CodecError(#[source] Box<dyn std::error::Error + Send + Sync>);

impl CodecError {
    /// Creates a codec error from any underlying cause.
    pub fn new(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self(cause.into())
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(error)
    }
}

/// Turns domain values into cache-storable strings and back.
pub trait Codec: Send + Sync {
    /// Encodes a value into its stored string form.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] when the value cannot be encoded.
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, CodecError>;

    /// Decodes a stored string into a value.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] when the stored form does not decode to `T`.
    fn decode<T: DeserializeOwned>(&self, raw: &str) -> Result<T, CodecError>;

    /// Decodes a stored string into a sequence of values.
    ///
    /// The default implementation delegates to [`decode`](Self::decode) since
    /// typed deserialization already carries the sequence shape; override it
    /// for codecs whose sequence framing differs from their scalar framing.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] when the stored form does not decode to a
    /// sequence of `T`.
    fn decode_seq<T: DeserializeOwned>(&self, raw: &str) -> Result<Vec<T>, CodecError> {
        self.decode(raw)
    }
}

/// The default codec: JSON via serde_json.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, CodecError> {
        serde_json::to_string(value).map_err(CodecError::from)
    }

    fn decode<T: DeserializeOwned>(&self, raw: &str) -> Result<T, CodecError> {
        serde_json::from_str(raw).map_err(CodecError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Account {
        id: u64,
        name: String,
    }

    #[test]
    fn encode_then_decode_round_trips() {
        let account = Account {
            id: 5,
            name: "Alice".to_owned(),
        };

        let raw = JsonCodec.encode(&account).expect("encode failed");
        let decoded: Account = JsonCodec.decode(&raw).expect("decode failed");
        assert_eq!(decoded, account);
    }

    #[test]
    fn decode_seq_handles_json_arrays() {
        let values: Vec<u64> = JsonCodec.decode_seq("[1,2,3]").expect("decode failed");
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn decode_rejects_malformed_input() {
        let result: Result<Account, _> = JsonCodec.decode("not json");
        let error = result.expect_err("should fail");
        assert!(format!("{error}").contains("codec failure"));
    }

    #[test]
    fn decode_rejects_shape_mismatch() {
        let result: Result<Vec<u64>, _> = JsonCodec.decode_seq("{\"id\":5}");
        assert!(result.is_err());
    }
}
