//! Typed artifacts for tests.

use dcp_types::{
    ActionType, AgentPassport, AuditDecision, Channel, CitizenshipBundle, Decision, EntityType,
    HumanBindingRecord, Intent, IntentTarget, LiabilityMode, PassportStatus, PolicyDecision,
    RiskLevel, DCP_VERSION,
};

use crate::builder::{AuditEntryDraft, BundleBuilder};

pub(crate) fn human_binding_record() -> HumanBindingRecord {
    HumanBindingRecord {
        dcp_version: DCP_VERSION.into(),
        human_id: "human-1".into(),
        legal_name: "Alice Example".into(),
        entity_type: EntityType::NaturalPerson,
        jurisdiction: "US-CA".into(),
        liability_mode: LiabilityMode::OwnerResponsible,
        override_rights: true,
        issued_at: "2025-01-01T00:00:00Z".into(),
        expires_at: None,
        contact: None,
        signature: "unsigned".into(),
    }
}

pub(crate) fn agent_passport() -> AgentPassport {
    AgentPassport {
        dcp_version: DCP_VERSION.into(),
        agent_id: "agent-1".into(),
        public_key: "agent-key".into(),
        human_binding_reference: "human-1".into(),
        capabilities: Some(vec!["email".into()]),
        risk_tier: Some(RiskLevel::Low),
        created_at: "2025-01-01T00:00:00Z".into(),
        status: PassportStatus::Active,
        signature: "unsigned".into(),
    }
}

pub(crate) fn intent() -> Intent {
    let mut target = IntentTarget::channel(Channel::Email);
    target.to = Some("alice@example.test".into());
    Intent {
        dcp_version: DCP_VERSION.into(),
        intent_id: "intent-1".into(),
        agent_id: "agent-1".into(),
        human_id: "human-1".into(),
        timestamp: "2025-01-01T00:00:00Z".into(),
        action_type: ActionType::SendEmail,
        target,
        data_classes: vec!["contact_info".into()],
        estimated_impact: RiskLevel::Low,
        requires_consent: None,
    }
}

pub(crate) fn policy_decision() -> PolicyDecision {
    PolicyDecision {
        dcp_version: DCP_VERSION.into(),
        intent_id: "intent-1".into(),
        decision: Decision::Approve,
        risk_score: 0.25,
        reasons: vec!["low risk".into()],
        required_confirmation: None,
    }
}

/// Every artifact set, no audit entries.
pub(crate) fn builder() -> BundleBuilder {
    BundleBuilder::new()
        .human_binding_record(human_binding_record())
        .agent_passport(agent_passport())
        .intent(intent())
        .policy_decision(policy_decision())
}

/// A complete bundle with `entries` chained audit entries.
pub(crate) fn bundle(entries: usize) -> CitizenshipBundle {
    let mut builder = builder();
    for i in 0..entries {
        builder = builder
            .create_audit_entry(AuditEntryDraft::new(AuditDecision::Approved, format!("step {i}")))
            .unwrap();
    }
    builder.build().unwrap()
}
