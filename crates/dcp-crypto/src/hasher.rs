//! SHA-256 content hashing over canonical JSON.

use dcp_types::{ContentHash, SHA256_PREFIX};
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::canonical::{canonicalize, canonicalize_value, CanonicalError};

pub type HashResult<T> = Result<T, CanonicalError>;

/// SHA-256 of raw bytes.
pub fn sha256(data: &[u8]) -> ContentHash {
    let digest = Sha256::digest(data);
    ContentHash::from_hash(digest.into())
}

/// `SHA256(canonicalize(value))`.
pub fn hash<T: Serialize + ?Sized>(value: &T) -> HashResult<ContentHash> {
    Ok(sha256(&canonicalize(value)?))
}

/// Hash of an already-parsed JSON value. Infallible.
pub fn hash_value(value: &Value) -> ContentHash {
    sha256(&canonicalize_value(value))
}

/// Hash an audit entry must carry in `intent_hash`.
pub fn intent_hash<T: Serialize + ?Sized>(intent: &T) -> HashResult<ContentHash> {
    hash(intent)
}

/// Hash the *next* audit entry must carry in `prev_hash`.
pub fn prev_hash_for_entry<T: Serialize + ?Sized>(entry: &T) -> HashResult<ContentHash> {
    hash(entry)
}

/// Prefixed `"sha256:<hex>"` hash of a citizenship bundle.
pub fn bundle_hash<T: Serialize + ?Sized>(bundle: &T) -> HashResult<String> {
    Ok(format!("{SHA256_PREFIX}{}", hash(bundle)?.to_hex()))
}
