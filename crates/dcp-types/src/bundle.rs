use std::fmt;

use serde::{Deserialize, Serialize};

use crate::audit::AuditEntry;
use crate::identity::{AgentPassport, HumanBindingRecord};
use crate::intent::{Intent, PolicyDecision};

/// Citizenship bundle: every DCP artifact for one intent.
///
/// The current protocol carries exactly one intent per bundle; every audit
/// entry must reference it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CitizenshipBundle {
    pub human_binding_record: HumanBindingRecord,
    pub agent_passport: AgentPassport,
    pub intent: Intent,
    pub policy_decision: PolicyDecision,
    pub audit_entries: Vec<AuditEntry>,
}

/// Who signed a bundle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignerType {
    Human,
    Organization,
}

impl fmt::Display for SignerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Human => write!(f, "human"),
            Self::Organization => write!(f, "organization"),
        }
    }
}

/// Signer block of a [`BundleSignature`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerInfo {
    #[serde(rename = "type")]
    pub signer_type: SignerType,
    pub id: String,
    pub public_key_b64: String,
}

/// Detached Ed25519 signature over the canonical bundle, plus the hashes
/// the signer committed to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleSignature {
    /// Always `"ed25519"`.
    pub alg: String,
    pub created_at: String,
    pub signer: SignerInfo,
    /// `"sha256:<hex>"` of the canonical bundle.
    pub bundle_hash: String,
    /// `"sha256:<hex>"` Merkle root over the audit entry hashes, or `null`.
    pub merkle_root: Option<String>,
    pub sig_b64: String,
}

/// A bundle together with its signature.
///
/// Any change to `bundle` after signing invalidates `signature`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignedBundle {
    pub bundle: CitizenshipBundle,
    pub signature: BundleSignature,
}

impl SignedBundle {
    /// The agent this bundle speaks for.
    pub fn agent_id(&self) -> &str {
        &self.bundle.agent_passport.agent_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn signer_info_uses_type_key() {
        let signer = SignerInfo {
            signer_type: SignerType::Organization,
            id: "org-1".into(),
            public_key_b64: "pk".into(),
        };
        assert_eq!(
            serde_json::to_value(&signer).unwrap(),
            json!({"type": "organization", "id": "org-1", "public_key_b64": "pk"})
        );
    }

    #[test]
    fn merkle_root_null_roundtrip() {
        let value = json!({
            "alg": "ed25519",
            "created_at": "2025-01-01T00:00:00Z",
            "signer": {"type": "human", "id": "h", "public_key_b64": "pk"},
            "bundle_hash": "sha256:00",
            "merkle_root": null,
            "sig_b64": "c2ln"
        });
        let sig: BundleSignature = serde_json::from_value(value.clone()).unwrap();
        assert!(sig.merkle_root.is_none());
        assert_eq!(serde_json::to_value(&sig).unwrap(), value);
    }
}
