//! Bundle verification for the Digital Citizenship Protocol.
//!
//! A signed citizenship bundle is checked by an ordered, fail-fast pipeline
//! of stages: signature, bundle hash, Merkle root, audit chain. Optional
//! extension stages (revocation, jurisdiction attestation, anchor receipt,
//! transparency-log inclusion) run afterwards against pluggable
//! collaborators. The result is a `{verified, errors}` report whose error
//! kinds are stable wire names.
//!
//! # Quick Start
//!
//! ```rust
//! use dcp_verify::{BundleVerifier, VerifierConfig, VerificationErrorKind};
//! use serde_json::json;
//!
//! let verifier = BundleVerifier::with_default_stages(VerifierConfig::default());
//! let result = verifier.verify_json(&json!({"bundle": {}}), None).unwrap();
//! assert!(!result.verified);
//! assert_eq!(result.first_kind(), Some(VerificationErrorKind::MalformedSignedBundle));
//! ```

pub mod config;
pub mod error;
pub mod input;
pub mod report;
pub mod schema;
pub mod stage;
pub mod stages;
pub mod verifier;

#[cfg(test)]
mod fixtures;

pub use config::{Extension, VerifierConfig};
pub use error::VerifyError;
pub use input::VerificationInput;
pub use report::{StageResult, VerificationError, VerificationErrorKind, VerificationResult};
pub use schema::{SchemaReport, SchemaValidator, TypedSchemaValidator};
pub use stage::{StageOutcome, VerificationStage};
pub use stages::attestation::attestation_payload;
pub use stages::{
    AnchorReader, AnchorReceipt, AnchorStage, AttestationKeyDirectory, AttestationStage,
    AuditChainStage, BundleHashStage, InclusionEvidence, InclusionProofSource,
    MemoryAnchorReader, MerkleRootStage, RevocationList, RevocationSource, RevocationStage,
    SignatureStage, StaticKeyDirectory, TransparencyStage,
};
pub use verifier::{verify_signed_bundle, BundleVerifier};
