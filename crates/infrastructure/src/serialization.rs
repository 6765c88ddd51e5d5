//! Stable JSON encoding for files the client writes.
//!
//! Output uses 2-space indentation and a trailing newline. Key order follows
//! the source type, so persisted maps are `BTreeMap`s.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::ser::{PrettyFormatter, Serializer};

/// Error type for serialization operations.
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// Encoding failed.
    #[error("JSON serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Decoding failed.
    #[error("JSON deserialization failed: {0}")]
    Deserialize(#[source] serde_json::Error),
}

/// Encodes a value as stable, pretty-printed JSON bytes.
///
/// # Errors
/// Returns an error if the value cannot be represented as JSON.
pub fn to_json_stable_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, SerializationError> {
    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"  "));
    value
        .serialize(&mut serializer)
        .map_err(SerializationError::Serialize)?;
    buffer.push(b'\n');
    Ok(buffer)
}

/// Decodes JSON bytes.
///
/// # Errors
/// Returns an error if the bytes are not valid JSON for `T`.
pub fn from_json_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SerializationError> {
    serde_json::from_slice(bytes).map_err(SerializationError::Deserialize)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_stable_layout() {
        let map = BTreeMap::from([("teacare.refreshToken", "r"), ("teacare.accessToken", "a")]);
        let text = String::from_utf8(to_json_stable_bytes(&map).unwrap()).unwrap();
        assert_eq!(
            text,
            "{\n  \"teacare.accessToken\": \"a\",\n  \"teacare.refreshToken\": \"r\"\n}\n"
        );
    }

    #[test]
    fn test_decode_error() {
        let result: Result<BTreeMap<String, String>, _> = from_json_bytes(b"{\"broken\": }");
        assert!(matches!(result, Err(SerializationError::Deserialize(_))));
    }
}
