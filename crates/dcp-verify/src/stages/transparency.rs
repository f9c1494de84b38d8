use dcp_crypto::{hash, verify_with_mode, MerkleMode, ProofStep};
use dcp_types::ContentHash;
use serde::{Deserialize, Serialize};

use crate::config::Extension;
use crate::error::VerifyError;
use crate::input::VerificationInput;
use crate::report::{VerificationError, VerificationErrorKind};
use crate::stage::{StageOutcome, VerificationStage};

/// An inclusion proof for one logged bundle hash.
///
/// Deserializes from a transparency-log proof response; unknown fields
/// (`index`, `entry`) are ignored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusionEvidence {
    pub leaf_hash: ContentHash,
    pub root: ContentHash,
    pub proof: Vec<ProofStep>,
    #[serde(default)]
    pub mode: MerkleMode,
}

/// Where inclusion proofs come from: a log client, a local log, or a proof
/// the caller already holds.
pub trait InclusionProofSource: Send + Sync {
    fn inclusion_proof(&self, bundle_hash: &str) -> Result<Option<InclusionEvidence>, VerifyError>;
}

impl InclusionProofSource for InclusionEvidence {
    fn inclusion_proof(&self, _bundle_hash: &str) -> Result<Option<InclusionEvidence>, VerifyError> {
        Ok(Some(self.clone()))
    }
}

/// Checks that the bundle hash is included in the transparency log.
///
/// The expected leaf is `hash(bundle_hash)`, the hash of the JSON string.
pub struct TransparencyStage {
    source: Box<dyn InclusionProofSource>,
}

impl TransparencyStage {
    pub fn new(source: Box<dyn InclusionProofSource>) -> Self {
        Self { source }
    }
}

impl VerificationStage for TransparencyStage {
    fn name(&self) -> &str {
        "transparency"
    }

    fn extension(&self) -> Option<Extension> {
        Some(Extension::Transparency)
    }

    fn evaluate(&self, input: &VerificationInput) -> Result<StageOutcome, VerifyError> {
        let bundle_hash = super::prefixed(&dcp_crypto::hash_value(input.bundle()));
        let expected_leaf = hash(&bundle_hash).map_err(|e| VerifyError::stage(self.name(), e.to_string()))?;
        let fail = |message: &str| {
            VerificationError::new(VerificationErrorKind::TransparencyProofInvalid, message)
                .with("bundle_hash", bundle_hash.clone())
        };

        let Some(evidence) = self.source.inclusion_proof(&bundle_hash)? else {
            return Ok(StageOutcome::Fail(fail("bundle hash is not in the transparency log")));
        };

        if evidence.leaf_hash != expected_leaf {
            return Ok(StageOutcome::Fail(
                fail("proof leaf is not the hash of this bundle")
                    .with("expected", expected_leaf.to_hex())
                    .with("actual", evidence.leaf_hash.to_hex()),
            ));
        }
        if !verify_with_mode(evidence.mode, &expected_leaf, &evidence.proof, &evidence.root) {
            return Ok(StageOutcome::Fail(
                fail("inclusion proof does not recompute the log root")
                    .with("root", evidence.root.to_hex()),
            ));
        }
        Ok(StageOutcome::Pass)
    }
}
