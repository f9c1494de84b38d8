use chrono::{SecondsFormat, Utc};
use dcp_crypto::{intent_hash, AuditChainVerifier};
use dcp_types::{
    AgentPassport, AuditDecision, AuditEntry, AuditEvidence, CitizenshipBundle, HumanBindingRecord,
    Intent, PolicyDecision, DCP_VERSION,
};
use uuid::Uuid;

use crate::error::{SdkError, SdkResult};

/// What the caller decides about a new audit entry. Identity fields and
/// chain hashes come from the builder.
#[derive(Clone, Debug, PartialEq)]
pub struct AuditEntryDraft {
    /// Defaults to a fresh UUIDv7.
    pub audit_id: Option<String>,
    /// Defaults to now, RFC 3339 UTC.
    pub timestamp: Option<String>,
    pub policy_decision: AuditDecision,
    pub outcome: String,
    pub evidence: AuditEvidence,
}

impl AuditEntryDraft {
    pub fn new(policy_decision: AuditDecision, outcome: impl Into<String>) -> Self {
        Self {
            audit_id: None,
            timestamp: None,
            policy_decision,
            outcome: outcome.into(),
            evidence: AuditEvidence::default(),
        }
    }

    pub fn with_audit_id(mut self, audit_id: impl Into<String>) -> Self {
        self.audit_id = Some(audit_id.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    pub fn with_evidence(mut self, evidence: AuditEvidence) -> Self {
        self.evidence = evidence;
        self
    }
}

/// Fluent builder for [`CitizenshipBundle`].
#[derive(Clone, Debug, Default)]
pub struct BundleBuilder {
    human_binding_record: Option<HumanBindingRecord>,
    agent_passport: Option<AgentPassport>,
    intent: Option<Intent>,
    policy_decision: Option<PolicyDecision>,
    audit_entries: Vec<AuditEntry>,
}

impl BundleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn human_binding_record(mut self, record: HumanBindingRecord) -> Self {
        self.human_binding_record = Some(record);
        self
    }

    pub fn agent_passport(mut self, passport: AgentPassport) -> Self {
        self.agent_passport = Some(passport);
        self
    }

    pub fn intent(mut self, intent: Intent) -> Self {
        self.intent = Some(intent);
        self
    }

    pub fn policy_decision(mut self, decision: PolicyDecision) -> Self {
        self.policy_decision = Some(decision);
        self
    }

    /// Append a ready-made entry as is. Its chain hashes are not checked
    /// here; verification will.
    pub fn add_audit_entry(mut self, entry: AuditEntry) -> Self {
        self.audit_entries.push(entry);
        self
    }

    /// Append a new audit entry chained onto the current last entry.
    ///
    /// `intent_hash` is the hash of the builder's intent and `prev_hash`
    /// is `GENESIS` for the first entry, the hash of the previous entry
    /// otherwise. Agent, human and intent ids are taken from the intent.
    pub fn create_audit_entry(mut self, draft: AuditEntryDraft) -> SdkResult<Self> {
        let intent = self.intent.as_ref().ok_or(SdkError::MissingArtifact("intent"))?;
        let intent_hash = intent_hash(intent)?.to_hex();
        let prev_hash = AuditChainVerifier::next_prev_hash(&self.audit_entries)?;

        let entry = AuditEntry {
            dcp_version: DCP_VERSION.to_string(),
            audit_id: draft.audit_id.unwrap_or_else(|| Uuid::now_v7().to_string()),
            prev_hash,
            timestamp: draft.timestamp.unwrap_or_else(now_rfc3339),
            agent_id: intent.agent_id.clone(),
            human_id: intent.human_id.clone(),
            intent_id: intent.intent_id.clone(),
            intent_hash,
            policy_decision: draft.policy_decision,
            outcome: draft.outcome,
            evidence: draft.evidence,
        };
        self.audit_entries.push(entry);
        Ok(self)
    }

    pub fn audit_entries(&self) -> &[AuditEntry] {
        &self.audit_entries
    }

    /// Assemble the bundle. Every artifact and at least one audit entry
    /// must be present.
    pub fn build(self) -> SdkResult<CitizenshipBundle> {
        let human_binding_record = self
            .human_binding_record
            .ok_or(SdkError::MissingArtifact("human_binding_record"))?;
        let agent_passport = self
            .agent_passport
            .ok_or(SdkError::MissingArtifact("agent_passport"))?;
        let intent = self.intent.ok_or(SdkError::MissingArtifact("intent"))?;
        let policy_decision = self
            .policy_decision
            .ok_or(SdkError::MissingArtifact("policy_decision"))?;
        if self.audit_entries.is_empty() {
            return Err(SdkError::NoAuditEntries);
        }

        Ok(CitizenshipBundle {
            human_binding_record,
            agent_passport,
            intent,
            policy_decision,
            audit_entries: self.audit_entries,
        })
    }
}

pub(crate) fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use dcp_crypto::hash;
    use dcp_types::GENESIS;

    #[test]
    fn entries_chain_from_genesis() {
        let bundle = fixtures::builder()
            .create_audit_entry(AuditEntryDraft::new(AuditDecision::Approved, "drafted"))
            .unwrap()
            .create_audit_entry(AuditEntryDraft::new(AuditDecision::Approved, "sent"))
            .unwrap()
            .build()
            .unwrap();

        let entries = &bundle.audit_entries;
        assert_eq!(entries[0].prev_hash, GENESIS);
        assert_eq!(entries[1].prev_hash, hash(&entries[0]).unwrap().to_hex());
        assert_eq!(entries[0].intent_hash, hash(&bundle.intent).unwrap().to_hex());
        assert_eq!(entries[0].agent_id, bundle.intent.agent_id);
        assert!(AuditChainVerifier::verify(&bundle.intent, entries).is_ok());
    }

    #[test]
    fn draft_overrides_generated_fields() {
        let builder = fixtures::builder()
            .create_audit_entry(
                AuditEntryDraft::new(AuditDecision::Escalated, "waiting")
                    .with_audit_id("audit-42")
                    .with_timestamp("2025-01-01T00:00:00Z")
                    .with_evidence(AuditEvidence::from_tool("mailer", None)),
            )
            .unwrap();
        let entry = &builder.audit_entries()[0];
        assert_eq!(entry.audit_id, "audit-42");
        assert_eq!(entry.timestamp, "2025-01-01T00:00:00Z");
        assert_eq!(entry.evidence.tool.as_deref(), Some("mailer"));
    }

    #[test]
    fn generated_ids_are_unique() {
        let builder = fixtures::builder()
            .create_audit_entry(AuditEntryDraft::new(AuditDecision::Approved, "a"))
            .unwrap()
            .create_audit_entry(AuditEntryDraft::new(AuditDecision::Approved, "b"))
            .unwrap();
        let entries = builder.audit_entries();
        assert_ne!(entries[0].audit_id, entries[1].audit_id);
        assert!(entries[0].timestamp.ends_with('Z'));
    }

    #[test]
    fn audit_entry_needs_intent() {
        let err = BundleBuilder::new()
            .create_audit_entry(AuditEntryDraft::new(AuditDecision::Approved, "x"))
            .unwrap_err();
        assert!(matches!(err, SdkError::MissingArtifact("intent")));
    }

    #[test]
    fn build_reports_missing_artifacts() {
        let missing = |builder: BundleBuilder| match builder.build() {
            Err(SdkError::MissingArtifact(name)) => name,
            other => panic!("expected MissingArtifact, got {other:?}"),
        };

        assert_eq!(missing(BundleBuilder::new()), "human_binding_record");
        assert_eq!(
            missing(BundleBuilder::new().human_binding_record(fixtures::human_binding_record())),
            "agent_passport"
        );
        assert_eq!(
            missing(
                BundleBuilder::new()
                    .human_binding_record(fixtures::human_binding_record())
                    .agent_passport(fixtures::agent_passport())
                    .intent(fixtures::intent())
            ),
            "policy_decision"
        );
    }

    #[test]
    fn build_requires_an_entry() {
        assert!(matches!(fixtures::builder().build(), Err(SdkError::NoAuditEntries)));
    }
}
