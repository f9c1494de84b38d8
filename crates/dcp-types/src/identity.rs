use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of legal entity that owns an agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    NaturalPerson,
    Organization,
}

/// Liability model accepted by the human owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiabilityMode {
    OwnerResponsible,
}

/// Lifecycle status of an agent passport.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassportStatus {
    Active,
    Revoked,
    Suspended,
}

impl fmt::Display for PassportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Revoked => write!(f, "revoked"),
            Self::Suspended => write!(f, "suspended"),
        }
    }
}

/// DCP-01: binds a human (or organization) to the agents acting for them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HumanBindingRecord {
    pub dcp_version: String,
    pub human_id: String,
    pub legal_name: String,
    pub entity_type: EntityType,
    pub jurisdiction: String,
    pub liability_mode: LiabilityMode,
    pub override_rights: bool,
    pub issued_at: String,
    /// Serialized as `null` when absent.
    pub expires_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    pub signature: String,
}

/// DCP-01: the agent's identity document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentPassport {
    pub dcp_version: String,
    pub agent_id: String,
    /// Base64 Ed25519 public key of the agent.
    pub public_key: String,
    /// `human_id` of the owning [`HumanBindingRecord`].
    pub human_binding_reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_tier: Option<crate::intent::RiskLevel>,
    pub created_at: String,
    pub status: PassportStatus,
    pub signature: String,
}

impl AgentPassport {
    /// Returns `true` if the passport is in the `active` state.
    pub fn is_active(&self) -> bool {
        self.status == PassportStatus::Active
    }
}
