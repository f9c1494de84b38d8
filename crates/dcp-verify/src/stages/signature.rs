use crate::error::VerifyError;
use crate::input::VerificationInput;
use crate::report::{VerificationError, VerificationErrorKind};
use crate::stage::{StageOutcome, VerificationStage};

/// Step 1: the Ed25519 signature over the canonical bundle.
pub struct SignatureStage;

impl VerificationStage for SignatureStage {
    fn name(&self) -> &str {
        "signature"
    }

    fn evaluate(&self, input: &VerificationInput) -> Result<StageOutcome, VerifyError> {
        if dcp_crypto::verify(input.bundle(), input.sig_b64(), input.public_key_b64()) {
            return Ok(StageOutcome::Pass);
        }
        Ok(StageOutcome::Fail(
            VerificationError::new(
                VerificationErrorKind::SignatureInvalid,
                "signature does not verify over the canonical bundle",
            )
            .with("public_key_b64", input.public_key_b64()),
        ))
    }
}
