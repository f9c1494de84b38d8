use dcp_crypto::hash_value;

use crate::error::VerifyError;
use crate::input::VerificationInput;
use crate::report::{VerificationError, VerificationErrorKind};
use crate::stage::{StageOutcome, VerificationStage};
use crate::stages::prefixed;

/// Step 2: `signature.bundle_hash` against the recomputed bundle hash.
///
/// Comparison is on the full `"sha256:<hex>"` string, so a bare hex value
/// is a mismatch.
pub struct BundleHashStage {
    required: bool,
}

impl BundleHashStage {
    pub fn new(required: bool) -> Self {
        Self { required }
    }
}

impl VerificationStage for BundleHashStage {
    fn name(&self) -> &str {
        "bundle_hash"
    }

    fn evaluate(&self, input: &VerificationInput) -> Result<StageOutcome, VerifyError> {
        let expected = prefixed(&hash_value(input.bundle()));

        let Some(claimed) = input.claimed_bundle_hash() else {
            if self.required {
                return Ok(StageOutcome::Fail(VerificationError::mismatch(
                    VerificationErrorKind::BundleHashMismatch,
                    "signature.bundle_hash is required but absent",
                    expected,
                    serde_json::Value::Null,
                )));
            }
            return Ok(StageOutcome::skip("bundle_hash absent"));
        };

        if claimed.as_str() == Some(expected.as_str()) {
            return Ok(StageOutcome::Pass);
        }
        Ok(StageOutcome::Fail(VerificationError::mismatch(
            VerificationErrorKind::BundleHashMismatch,
            "signature.bundle_hash does not match the bundle",
            expected,
            claimed.clone(),
        )))
    }
}
