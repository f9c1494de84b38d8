use dcp_crypto::{hash_value, AuditChainVerifier, ChainError};

use crate::error::VerifyError;
use crate::input::VerificationInput;
use crate::report::{VerificationError, VerificationErrorKind};
use crate::stage::{StageOutcome, VerificationStage};

/// Step 4: every audit entry references the intent and links to its
/// predecessor.
pub struct AuditChainStage;

impl VerificationStage for AuditChainStage {
    fn name(&self) -> &str {
        "audit_chain"
    }

    fn evaluate(&self, input: &VerificationInput) -> Result<StageOutcome, VerifyError> {
        let intent_hash = hash_value(input.intent()).to_hex();
        let entries = input.audit_entries();

        match AuditChainVerifier::verify_with_intent_hash(&intent_hash, entries) {
            Ok(()) => Ok(StageOutcome::Pass),
            Err(ChainError::IntentHashMismatch {
                index,
                expected,
                actual,
            }) => Ok(StageOutcome::Fail(
                VerificationError::mismatch(
                    VerificationErrorKind::IntentHashMismatch,
                    format!("audit entry {index} does not reference the bundle intent"),
                    expected,
                    actual,
                )
                .with("index", index),
            )),
            Err(ChainError::PrevHashMismatch {
                index,
                expected,
                actual,
            }) => Ok(StageOutcome::Fail(
                VerificationError::mismatch(
                    VerificationErrorKind::PrevHashChainMismatch,
                    format!("audit entry {index} breaks the hash chain"),
                    expected,
                    actual,
                )
                .with("index", index),
            )),
            Err(e @ ChainError::Unhashable { .. }) => Err(VerifyError::stage(self.name(), e.to_string())),
        }
    }
}
