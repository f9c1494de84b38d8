use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::hash::GENESIS;

/// Decision recorded in an audit entry (past tense of [`crate::Decision`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditDecision {
    Approved,
    Escalated,
    Blocked,
}

impl From<crate::intent::Decision> for AuditDecision {
    fn from(decision: crate::intent::Decision) -> Self {
        match decision {
            crate::intent::Decision::Approve => Self::Approved,
            crate::intent::Decision::Escalate => Self::Escalated,
            crate::intent::Decision::Block => Self::Blocked,
        }
    }
}

impl fmt::Display for AuditDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Approved => write!(f, "approved"),
            Self::Escalated => write!(f, "escalated"),
            Self::Blocked => write!(f, "blocked"),
        }
    }
}

/// Evidence attached to an audit entry.
///
/// `tool` and `result_ref` are always serialized (as `null` when absent);
/// any additional keys survive a typed round-trip through `extra`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditEvidence {
    pub tool: Option<String>,
    pub result_ref: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl AuditEvidence {
    /// Evidence produced by a named tool.
    pub fn from_tool(tool: impl Into<String>, result_ref: Option<String>) -> Self {
        Self {
            tool: Some(tool.into()),
            result_ref,
            extra: BTreeMap::new(),
        }
    }
}

/// DCP-03: one link of the audit chain.
///
/// `prev_hash` is [`GENESIS`] for the first entry and the bare hex hash of
/// the preceding entry otherwise. `intent_hash` is the bare hex hash of the
/// bundle's intent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub dcp_version: String,
    pub audit_id: String,
    pub prev_hash: String,
    pub timestamp: String,
    pub agent_id: String,
    pub human_id: String,
    pub intent_id: String,
    pub intent_hash: String,
    pub policy_decision: AuditDecision,
    pub outcome: String,
    pub evidence: AuditEvidence,
}

impl AuditEntry {
    /// Returns `true` if this entry starts a chain.
    pub fn is_genesis(&self) -> bool {
        self.prev_hash == GENESIS
    }
}
