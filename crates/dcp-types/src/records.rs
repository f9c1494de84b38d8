use serde::{Deserialize, Serialize};

/// Signed statement that an owner has revoked one of their agents.
///
/// Only the record shape lives here; the registry that stores them is an
/// external collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationRecord {
    pub dcp_version: String,
    pub agent_id: String,
    pub human_id: String,
    pub timestamp: String,
    pub reason: String,
    pub signature: String,
}

/// Human answer to an escalated intent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationDecision {
    Approve,
    Deny,
}

/// Signed human confirmation of an escalated intent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HumanConfirmation {
    pub dcp_version: String,
    pub intent_id: String,
    pub human_id: String,
    pub timestamp: String,
    pub decision: ConfirmationDecision,
    pub signature: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmation_decision_serde() {
        let json = serde_json::to_string(&ConfirmationDecision::Deny).unwrap();
        assert_eq!(json, "\"deny\"");
    }

    #[test]
    fn revocation_record_roundtrip() {
        let record = RevocationRecord {
            dcp_version: "1.0".into(),
            agent_id: "agent-1".into(),
            human_id: "human-1".into(),
            timestamp: "2025-01-01T00:00:00Z".into(),
            reason: "key compromise".into(),
            signature: "sig".into(),
        };
        let json = serde_json::to_string(&record).unwrap();
        let parsed: RevocationRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, parsed);
    }
}
