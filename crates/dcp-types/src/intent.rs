use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Three-level scale used for risk tiers and estimated impact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Channel through which an intent reaches the outside world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Web,
    Api,
    Email,
    Calendar,
    Payments,
    Crm,
    Filesystem,
    Runtime,
}

/// The kind of action an agent declares before acting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Browse,
    ApiCall,
    SendEmail,
    CreateCalendarEvent,
    InitiatePayment,
    UpdateCrm,
    WriteFile,
    ExecuteCode,
}

/// Where an intent is directed.
///
/// Unknown keys are preserved in `extra` so foreign targets hash the same
/// after a typed round-trip.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntentTarget {
    pub channel: Channel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl IntentTarget {
    /// A target with only a channel set.
    pub fn channel(channel: Channel) -> Self {
        Self {
            channel,
            to: None,
            domain: None,
            url: None,
            extra: BTreeMap::new(),
        }
    }
}

/// DCP-02: an agent's declaration of what it is about to do.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub dcp_version: String,
    pub intent_id: String,
    pub agent_id: String,
    pub human_id: String,
    pub timestamp: String,
    pub action_type: ActionType,
    pub target: IntentTarget,
    pub data_classes: Vec<String>,
    pub estimated_impact: RiskLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_consent: Option<bool>,
}

/// Outcome of policy gating for an intent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Escalate,
    Block,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Approve => write!(f, "approve"),
            Self::Escalate => write!(f, "escalate"),
            Self::Block => write!(f, "block"),
        }
    }
}

/// Kind of human confirmation a policy may demand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationType {
    HumanApprove,
}

/// Confirmation requirement attached to an escalated decision.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredConfirmation {
    #[serde(rename = "type")]
    pub confirmation_type: ConfirmationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
}

/// DCP-02: the policy engine's verdict on an intent.
///
/// The core records the decision; it never decides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolicyDecision {
    pub dcp_version: String,
    pub intent_id: String,
    pub decision: Decision,
    /// In `[0, 1]`.
    pub risk_score: f64,
    pub reasons: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_confirmation: Option<RequiredConfirmation>,
}
