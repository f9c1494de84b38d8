//! Transport-agnostic request and response bodies.
//!
//! Hashes serialize as bare lowercase hex, proof directions as `"left"` /
//! `"right"`. An HTTP or RPC front end maps these one-to-one onto its
//! routes.

use dcp_crypto::{verify_with_mode, MerkleMode, ProofStep};
use dcp_types::{ContentHash, TransparencyLogEntry};
use dcp_verify::InclusionEvidence;
use serde::{Deserialize, Serialize};

use crate::error::LogError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddRequest {
    pub bundle_hash: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddResponse {
    pub index: u64,
    pub leaf_hash: ContentHash,
    pub root: ContentHash,
    pub size: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootResponse {
    /// `null` for an empty log.
    pub root: Option<ContentHash>,
    pub size: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofResponse {
    pub index: u64,
    pub leaf_hash: ContentHash,
    pub entry: TransparencyLogEntry,
    pub root: ContentHash,
    pub proof: Vec<ProofStep>,
    /// Omitted for the default construction.
    #[serde(default, skip_serializing_if = "is_legacy")]
    pub mode: MerkleMode,
}

fn is_legacy(mode: &MerkleMode) -> bool {
    *mode == MerkleMode::Legacy
}

impl ProofResponse {
    /// Recompute the root from the leaf and path.
    pub fn verify(&self) -> bool {
        verify_with_mode(self.mode, &self.leaf_hash, &self.proof, &self.root)
    }
}

impl From<ProofResponse> for InclusionEvidence {
    fn from(response: ProofResponse) -> Self {
        Self {
            leaf_hash: response.leaf_hash,
            root: response.root,
            proof: response.proof,
            mode: response.mode,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntriesResponse {
    pub entries: Vec<TransparencyLogEntry>,
    pub size: u64,
}

/// Error body: `{error, kind}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}

impl From<&LogError> for ErrorResponse {
    fn from(err: &LogError) -> Self {
        Self {
            error: err.to_string(),
            kind: err.kind().to_string(),
        }
    }
}
