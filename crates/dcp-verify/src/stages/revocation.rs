use std::collections::{BTreeMap, BTreeSet, HashSet};

use dcp_types::RevocationRecord;

use crate::config::Extension;
use crate::error::VerifyError;
use crate::input::VerificationInput;
use crate::report::{VerificationError, VerificationErrorKind};
use crate::stage::{StageOutcome, VerificationStage};

/// Lookup of revoked agents.
pub trait RevocationSource: Send + Sync {
    fn is_revoked(&self, agent_id: &str) -> Result<bool, VerifyError>;

    /// The revocation record for `agent_id`, when the source keeps records.
    /// Sources that only track identifiers keep the default.
    fn lookup(&self, _agent_id: &str) -> Result<Option<RevocationRecord>, VerifyError> {
        Ok(None)
    }
}

impl RevocationSource for HashSet<String> {
    fn is_revoked(&self, agent_id: &str) -> Result<bool, VerifyError> {
        Ok(self.contains(agent_id))
    }
}

impl RevocationSource for BTreeSet<String> {
    fn is_revoked(&self, agent_id: &str) -> Result<bool, VerifyError> {
        Ok(self.contains(agent_id))
    }
}

/// Revocation records keyed by agent id. The latest insert wins.
#[derive(Clone, Debug, Default)]
pub struct RevocationList {
    records: BTreeMap<String, RevocationRecord>,
}

impl RevocationList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: RevocationRecord) {
        self.records.insert(record.agent_id.clone(), record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<RevocationRecord> for RevocationList {
    fn from_iter<I: IntoIterator<Item = RevocationRecord>>(iter: I) -> Self {
        let mut list = Self::new();
        for record in iter {
            list.insert(record);
        }
        list
    }
}

impl RevocationSource for RevocationList {
    fn is_revoked(&self, agent_id: &str) -> Result<bool, VerifyError> {
        Ok(self.records.contains_key(agent_id))
    }

    fn lookup(&self, agent_id: &str) -> Result<Option<RevocationRecord>, VerifyError> {
        Ok(self.records.get(agent_id).cloned())
    }
}

/// Fails bundles whose agent appears in a revocation source.
pub struct RevocationStage {
    source: Box<dyn RevocationSource>,
}

impl RevocationStage {
    pub fn new(source: Box<dyn RevocationSource>) -> Self {
        Self { source }
    }
}

impl VerificationStage for RevocationStage {
    fn name(&self) -> &str {
        "revocation"
    }

    fn extension(&self) -> Option<Extension> {
        Some(Extension::Revocation)
    }

    fn evaluate(&self, input: &VerificationInput) -> Result<StageOutcome, VerifyError> {
        let Some(agent_id) = input.agent_id() else {
            return Ok(StageOutcome::skip("bundle has no agent_passport.agent_id"));
        };

        if let Some(record) = self.source.lookup(agent_id)? {
            return Ok(StageOutcome::Fail(
                VerificationError::new(
                    VerificationErrorKind::AgentRevoked,
                    format!("agent {agent_id} has been revoked"),
                )
                .with("agent_id", agent_id)
                .with("reason", record.reason)
                .with("revoked_at", record.timestamp),
            ));
        }
        if self.source.is_revoked(agent_id)? {
            return Ok(StageOutcome::Fail(
                VerificationError::new(
                    VerificationErrorKind::AgentRevoked,
                    format!("agent {agent_id} has been revoked"),
                )
                .with("agent_id", agent_id),
            ));
        }
        Ok(StageOutcome::Pass)
    }
}
