//! Built-in verification stages.
//!
//! The four mandatory protocol steps run in this order: signature, bundle
//! hash, Merkle root, audit chain. Extension stages follow in registration
//! order.

pub mod anchor;
pub mod attestation;
pub mod audit_chain;
pub mod bundle_hash;
pub mod merkle_root;
pub mod revocation;
pub mod signature;
pub mod transparency;

pub use anchor::{AnchorReader, AnchorReceipt, AnchorStage, MemoryAnchorReader};
pub use attestation::{AttestationKeyDirectory, AttestationStage, StaticKeyDirectory};
pub use audit_chain::AuditChainStage;
pub use bundle_hash::BundleHashStage;
pub use merkle_root::MerkleRootStage;
pub use revocation::{RevocationList, RevocationSource, RevocationStage};
pub use signature::SignatureStage;
pub use transparency::{InclusionEvidence, InclusionProofSource, TransparencyStage};

use dcp_types::{ContentHash, SHA256_PREFIX};

/// `"sha256:<hex>"` form used in bundle-level fields.
pub(crate) fn prefixed(hash: &ContentHash) -> String {
    format!("{SHA256_PREFIX}{}", hash.to_hex())
}
