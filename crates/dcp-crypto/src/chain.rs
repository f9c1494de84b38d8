use std::fmt;

use dcp_types::{AuditEntry, ContentHash, GENESIS};
use serde::Serialize;
use serde_json::Value;

use crate::hasher::hash;

/// An audit entry as seen by the chain verifier.
///
/// Implemented for the typed [`AuditEntry`] and for raw JSON, so foreign
/// entries are checked against the exact fields they carry.
pub trait ChainLink: Serialize {
    /// The entry's `prev_hash` field, if present and a string.
    fn prev_hash(&self) -> Option<&str>;
    /// The entry's `intent_hash` field, if present and a string.
    fn intent_hash(&self) -> Option<&str>;
}

impl ChainLink for AuditEntry {
    fn prev_hash(&self) -> Option<&str> {
        Some(&self.prev_hash)
    }
    fn intent_hash(&self) -> Option<&str> {
        Some(&self.intent_hash)
    }
}

impl ChainLink for Value {
    fn prev_hash(&self) -> Option<&str> {
        self.get("prev_hash").and_then(Value::as_str)
    }
    fn intent_hash(&self) -> Option<&str> {
        self.get("intent_hash").and_then(Value::as_str)
    }
}

/// Which field of an entry failed to link.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChainField {
    IntentHash,
    PrevHash,
}

impl fmt::Display for ChainField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IntentHash => write!(f, "intent_hash"),
            Self::PrevHash => write!(f, "prev_hash"),
        }
    }
}

/// Audit hash-chain verifier.
///
/// For every entry, in order: `intent_hash` must equal `hash(intent)`, then
/// `prev_hash` must be [`GENESIS`] (first entry) or `hash(previous entry)`.
/// Verification stops at the first broken entry. An empty chain is valid.
pub struct AuditChainVerifier;

impl AuditChainVerifier {
    /// Verify `entries` against the intent they record.
    pub fn verify<I, L>(intent: &I, entries: &[L]) -> Result<(), ChainError>
    where
        I: Serialize + ?Sized,
        L: ChainLink,
    {
        if entries.is_empty() {
            return Ok(());
        }
        let expected_intent = hash(intent)
            .map_err(|e| ChainError::Unhashable { index: None, reason: e.to_string() })?
            .to_hex();
        Self::verify_with_intent_hash(&expected_intent, entries)
    }

    /// Verify `entries` against a precomputed bare-hex intent hash.
    pub fn verify_with_intent_hash<L: ChainLink>(
        expected_intent: &str,
        entries: &[L],
    ) -> Result<(), ChainError> {
        let mut expected_prev = GENESIS.to_string();

        for (index, entry) in entries.iter().enumerate() {
            let actual = entry.intent_hash().unwrap_or_default();
            if actual != expected_intent {
                return Err(ChainError::IntentHashMismatch {
                    index,
                    expected: expected_intent.to_string(),
                    actual: actual.to_string(),
                });
            }

            let actual = entry.prev_hash().unwrap_or_default();
            if actual != expected_prev {
                return Err(ChainError::PrevHashMismatch {
                    index,
                    expected: expected_prev,
                    actual: actual.to_string(),
                });
            }

            expected_prev = Self::link_hash(entry)
                .map_err(|reason| ChainError::Unhashable { index: Some(index), reason })?
                .to_hex();
        }

        Ok(())
    }

    /// The `prev_hash` the entry after `entry` must carry.
    pub fn link_hash<L: ChainLink>(entry: &L) -> Result<ContentHash, String> {
        hash(entry).map_err(|e| e.to_string())
    }

    /// `prev_hash` for an entry appended after `entries`.
    pub fn next_prev_hash<L: ChainLink>(entries: &[L]) -> Result<String, ChainError> {
        match entries.last() {
            None => Ok(GENESIS.to_string()),
            Some(last) => Self::link_hash(last)
                .map(|h| h.to_hex())
                .map_err(|reason| ChainError::Unhashable {
                    index: Some(entries.len() - 1),
                    reason,
                }),
        }
    }
}

/// Errors from audit chain verification.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("intent_hash mismatch at entry {index}: expected {expected}, got {actual}")]
    IntentHashMismatch {
        index: usize,
        expected: String,
        actual: String,
    },

    #[error("prev_hash mismatch at entry {index}: expected {expected}, got {actual}")]
    PrevHashMismatch {
        index: usize,
        expected: String,
        actual: String,
    },

    #[error("cannot hash chain element {index:?}: {reason}")]
    Unhashable { index: Option<usize>, reason: String },
}

impl ChainError {
    /// Entry index the error refers to, if any.
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::IntentHashMismatch { index, .. } | Self::PrevHashMismatch { index, .. } => {
                Some(*index)
            }
            Self::Unhashable { index, .. } => *index,
        }
    }

    pub fn field(&self) -> Option<ChainField> {
        match self {
            Self::IntentHashMismatch { .. } => Some(ChainField::IntentHash),
            Self::PrevHashMismatch { .. } => Some(ChainField::PrevHash),
            Self::Unhashable { .. } => None,
        }
    }
}
