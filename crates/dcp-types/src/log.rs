use std::fmt;

use serde::{Deserialize, Serialize};

use crate::hash::ContentHash;

/// One leaf of the transparency log.
///
/// Entries are append-only: `index` starts at 0, increases by one per
/// append, and is never reused or reordered.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransparencyLogEntry {
    pub index: u64,
    /// `hash(bundle_hash)`: SHA-256 of the canonical JSON string.
    pub leaf_hash: ContentHash,
    /// The `"sha256:<hex>"` bundle hash that was logged.
    pub bundle_hash: String,
    /// RFC 3339 UTC time of the append.
    pub timestamp: String,
}

impl fmt::Display for TransparencyLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} [{}] {}", self.index, self.leaf_hash.short_hex(), self.bundle_hash)
    }
}
