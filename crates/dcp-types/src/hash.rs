use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Sentinel `prev_hash` of the first audit entry in a chain.
pub const GENESIS: &str = "GENESIS";

/// Prefix used by bundle-level hash fields (`bundle_hash`, `merkle_root`).
pub const SHA256_PREFIX: &str = "sha256:";

/// A SHA-256 digest.
///
/// Serialized as 64 lowercase hex characters. Merkle leaves, Merkle nodes
/// and audit chain links use this bare form; bundle-level fields use
/// [`ContentHash::to_prefixed`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Wrap a pre-computed digest.
    pub const fn from_hash(hash: [u8; 32]) -> Self {
        Self(hash)
    }

    /// The raw 32-byte digest.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// `"sha256:<hex>"` form used by bundle-level fields.
    pub fn to_prefixed(&self) -> String {
        format!("{SHA256_PREFIX}{}", self.to_hex())
    }

    /// Parse from a bare hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Parse from the `"sha256:<hex>"` form.
    pub fn from_prefixed(s: &str) -> Result<Self, TypeError> {
        let hex_part = s
            .strip_prefix(SHA256_PREFIX)
            .ok_or_else(|| TypeError::MissingPrefix {
                prefix: SHA256_PREFIX,
                value: s.to_string(),
            })?;
        Self::from_hex(hex_part)
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.short_hex())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for ContentHash {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; 32]> for ContentHash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<ContentHash> for [u8; 32] {
    fn from(hash: ContentHash) -> Self {
        hash.0
    }
}

impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ContentHash {
        ContentHash::from_hash([0xab; 32])
    }

    #[test]
    fn hex_roundtrip() {
        let h = sample();
        let parsed = ContentHash::from_hex(&h.to_hex()).unwrap();
        assert_eq!(h, parsed);
    }

    #[test]
    fn hex_is_lowercase_64_chars() {
        let hex = sample().to_hex();
        assert_eq!(hex.len(), 64);
        assert_eq!(hex, hex.to_lowercase());
    }

    #[test]
    fn prefixed_roundtrip() {
        let h = sample();
        let prefixed = h.to_prefixed();
        assert!(prefixed.starts_with("sha256:"));
        assert_eq!(ContentHash::from_prefixed(&prefixed).unwrap(), h);
    }

    #[test]
    fn prefixed_requires_prefix() {
        let err = ContentHash::from_prefixed(&sample().to_hex()).unwrap_err();
        assert!(matches!(err, TypeError::MissingPrefix { .. }));
    }

    #[test]
    fn rejects_wrong_length() {
        let err = ContentHash::from_hex("abcd").unwrap_err();
        assert_eq!(
            err,
            TypeError::InvalidLength {
                expected: 32,
                actual: 2
            }
        );
    }

    #[test]
    fn rejects_non_hex() {
        assert!(matches!(
            ContentHash::from_hex("zz"),
            Err(TypeError::InvalidHex(_))
        ));
    }

    #[test]
    fn serializes_as_hex_string() {
        let h = sample();
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, format!("\"{}\"", h.to_hex()));
        let parsed: ContentHash = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, h);
    }

    #[test]
    fn genesis_is_not_hex() {
        assert!(ContentHash::from_hex(GENESIS).is_err());
    }
}
