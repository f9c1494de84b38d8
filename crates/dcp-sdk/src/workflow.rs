use dcp_log::{AddResponse, LogStore, TransparencyLog};
use dcp_types::SignedBundle;
use dcp_verify::{BundleVerifier, TypedSchemaValidator, VerificationResult, VerifierConfig};
use tracing::{info, warn};

use crate::error::{SdkError, SdkResult};

/// Verify a signed bundle with structural checks and the default stages.
pub fn verify_bundle(
    signed: &SignedBundle,
    public_key_b64: Option<&str>,
) -> SdkResult<VerificationResult> {
    let verifier = BundleVerifier::with_default_stages(VerifierConfig::default())
        .with_schema_validator(Box::new(TypedSchemaValidator));
    Ok(verifier.verify_signed(signed, public_key_b64)?)
}

/// Log the bundle hash the signer committed to.
///
/// The hash is recomputed from the bundle first; a signature that claims a
/// different hash is refused and nothing is logged.
pub fn publish<S: LogStore>(log: &TransparencyLog<S>, signed: &SignedBundle) -> SdkResult<AddResponse> {
    let actual = dcp_crypto::bundle_hash(&signed.bundle)?;
    if actual != signed.signature.bundle_hash {
        warn!(claimed = %signed.signature.bundle_hash, %actual, "refusing to publish mismatched bundle hash");
        return Err(SdkError::BundleHashMismatch {
            claimed: signed.signature.bundle_hash.clone(),
            actual,
        });
    }
    let added = log.add(&actual)?;
    info!(agent = signed.agent_id(), index = added.index, "bundle published");
    Ok(added)
}
