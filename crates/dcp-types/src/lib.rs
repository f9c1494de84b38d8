//! Data model for the Digital Citizenship Protocol (DCP).
//!
//! This crate defines every artifact that travels inside a citizenship
//! bundle, plus the hash type shared by the rest of the workspace. Every
//! other DCP crate depends on `dcp-types`.
//!
//! # Key Types
//!
//! - [`ContentHash`]: SHA-256 digest rendered as lowercase hex
//! - [`HumanBindingRecord`] / [`AgentPassport`]: DCP-01 identity artifacts
//! - [`Intent`] / [`PolicyDecision`]: DCP-02 intent declaration and gating
//! - [`AuditEntry`]: DCP-03 hash-chained audit record
//! - [`CitizenshipBundle`] / [`SignedBundle`]: the portable record and its
//!   signed wrapper
//! - [`TransparencyLogEntry`]: one leaf of the transparency log

pub mod audit;
pub mod bundle;
pub mod error;
pub mod hash;
pub mod identity;
pub mod intent;
pub mod log;
pub mod records;

pub use audit::{AuditDecision, AuditEntry, AuditEvidence};
pub use bundle::{BundleSignature, CitizenshipBundle, SignedBundle, SignerInfo, SignerType};
pub use error::TypeError;
pub use hash::{ContentHash, GENESIS, SHA256_PREFIX};
pub use identity::{AgentPassport, EntityType, HumanBindingRecord, LiabilityMode, PassportStatus};
pub use intent::{
    ActionType, Channel, ConfirmationType, Decision, Intent, IntentTarget, PolicyDecision,
    RequiredConfirmation, RiskLevel,
};
pub use log::TransparencyLogEntry;
pub use records::{ConfirmationDecision, HumanConfirmation, RevocationRecord};

/// Protocol version stamped into every artifact produced by this workspace.
pub const DCP_VERSION: &str = "1.0";
