use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Encrypted form of an operation descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(with = "hex_bytes")]
    pub ciphertext: Vec<u8>,
    #[serde(with = "hex_bytes")]
    pub iv: Vec<u8>,
}

/// Payload carried by a log entry
///
/// Plaintext descriptors are kept as raw JSON so that a malformed one is
/// only discovered, and skipped, when the index is folded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Sealed(Envelope),
    Plain(Value),
}

impl Payload {
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        matches!(self, Payload::Sealed(_))
    }
}

/// One immutable record of the append-only log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// UUIDv7 assigned on append
    pub id: String,
    pub payload: Payload,
}

impl LogEntry {
    /// Wraps a payload with a fresh id.
    #[must_use]
    pub fn new(payload: Payload) -> Self {
        Self {
            id: uuid7::uuid7().to_string(),
            payload,
        }
    }
}

/// Hex encoding for byte fields in the JSON wire form
mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}
