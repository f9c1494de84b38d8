use dcp_crypto::{build_root, hash_value};
use serde_json::Value;

use crate::error::VerifyError;
use crate::input::VerificationInput;
use crate::report::{VerificationError, VerificationErrorKind};
use crate::stage::{StageOutcome, VerificationStage};
use crate::stages::prefixed;

/// Step 3: `signature.merkle_root` against the root over the audit entry
/// hashes. Only runs when the field is present and not null, unless the
/// stage is `required`.
pub struct MerkleRootStage {
    required: bool,
}

impl MerkleRootStage {
    pub fn new(required: bool) -> Self {
        Self { required }
    }
}

impl VerificationStage for MerkleRootStage {
    fn name(&self) -> &str {
        "merkle_root"
    }

    fn evaluate(&self, input: &VerificationInput) -> Result<StageOutcome, VerifyError> {
        let leaves: Vec<_> = input.audit_entries().iter().map(hash_value).collect();
        let expected = build_root(&leaves)
            .map(|root| Value::String(prefixed(&root)))
            .unwrap_or(Value::Null);

        let Some(claimed) = input.claimed_merkle_root() else {
            if self.required {
                return Ok(StageOutcome::Fail(VerificationError::mismatch(
                    VerificationErrorKind::MerkleRootMismatch,
                    "signature.merkle_root is required but absent",
                    expected,
                    Value::Null,
                )));
            }
            return Ok(StageOutcome::skip("merkle_root absent"));
        };

        if expected.is_string() && *claimed == expected {
            return Ok(StageOutcome::Pass);
        }
        Ok(StageOutcome::Fail(
            VerificationError::mismatch(
                VerificationErrorKind::MerkleRootMismatch,
                "signature.merkle_root does not match the audit entries",
                expected,
                claimed.clone(),
            )
            .with("leaf_count", leaves.len()),
        ))
    }
}
