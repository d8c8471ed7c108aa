//! Serde helpers for the node's JSON encoding conventions.
//!
//! Responsibilities:
//! - Encode byte fields as standard base64 strings, the way the node expects them.
//! - Accept `null` wherever the node may send an absent list or byte field.
//!
//! Explicitly does NOT handle:
//! - Validating higher-level semantics of decoded values.
//!
//! Invariants / assumptions:
//! - A `null` byte field decodes to an empty buffer; a `null` list decodes to an empty list.
//! - These helpers must not log or print payloads; errors should be generic parse errors.

use serde::{Deserialize, Deserializer};

/// Byte buffers as standard (padded) base64 strings.
pub mod base64_bytes {
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(Vec::new()),
            Some(encoded) => STANDARD.decode(encoded.as_bytes()).map_err(D::Error::custom),
        }
    }
}

/// Deserialize a list that the node may send as `null`.
pub fn vec_or_null<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize a string that the node may send as `null`.
pub fn string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Bytes {
        #[serde(with = "base64_bytes", default)]
        data: Vec<u8>,
    }

    #[derive(Debug, Deserialize)]
    struct Lists {
        #[serde(deserialize_with = "vec_or_null", default)]
        items: Vec<String>,
        #[serde(deserialize_with = "string_or_null", default)]
        name: String,
    }

    #[test]
    fn test_bytes_encode_as_base64() {
        let json = serde_json::to_string(&Bytes {
            data: b"Pong".to_vec(),
        })
        .unwrap();
        assert_eq!(json, r#"{"data":"UG9uZw=="}"#);
    }

    #[test]
    fn test_bytes_decode_null_and_missing_as_empty() {
        let decoded: Bytes = serde_json::from_str(r#"{"data":null}"#).unwrap();
        assert!(decoded.data.is_empty());
        let decoded: Bytes = serde_json::from_str("{}").unwrap();
        assert!(decoded.data.is_empty());
    }

    #[test]
    fn test_bytes_reject_invalid_base64() {
        let result: Result<Bytes, _> = serde_json::from_str(r#"{"data":"not base64!"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_null_list_and_string_decode_as_empty() {
        let lists: Lists = serde_json::from_str(r#"{"items":null,"name":null}"#).unwrap();
        assert!(lists.items.is_empty());
        assert!(lists.name.is_empty());

        let lists: Lists = serde_json::from_str(r#"{"items":["a","b"],"name":"x"}"#).unwrap();
        assert_eq!(lists.items, ["a", "b"]);
        assert_eq!(lists.name, "x");
    }
}
