use std::time::Instant;

use dcp_types::SignedBundle;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::VerifierConfig;
use crate::error::VerifyError;
use crate::input::VerificationInput;
use crate::report::{StageResult, VerificationError, VerificationErrorKind, VerificationResult};
use crate::schema::SchemaValidator;
use crate::stage::{StageOutcome, VerificationStage};
use crate::stages::{
    AnchorReader, AnchorStage, AttestationKeyDirectory, AttestationStage, AuditChainStage,
    BundleHashStage, InclusionProofSource, MerkleRootStage, RevocationSource, RevocationStage,
    SignatureStage, TransparencyStage,
};

/// Verifies signed citizenship bundles through an ordered stage pipeline.
///
/// The pipeline is fail-fast: the first failing stage ends the run and its
/// error is the only one reported. Structural (schema) errors are the
/// exception: they are all collected before any cryptographic stage runs.
pub struct BundleVerifier {
    stages: Vec<Box<dyn VerificationStage>>,
    schema: Option<Box<dyn SchemaValidator>>,
    config: VerifierConfig,
}

impl BundleVerifier {
    /// An empty pipeline. Use [`Self::with_default_stages`] for the protocol
    /// steps.
    pub fn new(config: VerifierConfig) -> Self {
        Self {
            stages: Vec::new(),
            schema: None,
            config,
        }
    }

    /// Signature -> bundle hash -> Merkle root -> audit chain.
    pub fn with_default_stages(config: VerifierConfig) -> Self {
        let (require_hash, require_root) = (config.require_bundle_hash, config.require_merkle_root);
        let mut verifier = Self::new(config);
        verifier.add_stage(Box::new(SignatureStage));
        verifier.add_stage(Box::new(BundleHashStage::new(require_hash)));
        verifier.add_stage(Box::new(MerkleRootStage::new(require_root)));
        verifier.add_stage(Box::new(AuditChainStage));
        verifier
    }

    /// Append a stage to the end of the pipeline.
    pub fn add_stage(&mut self, stage: Box<dyn VerificationStage>) {
        self.stages.push(stage);
    }

    pub fn with_schema_validator(mut self, validator: Box<dyn SchemaValidator>) -> Self {
        self.schema = Some(validator);
        self
    }

    pub fn with_revocation(mut self, source: Box<dyn RevocationSource>) -> Self {
        self.add_stage(Box::new(RevocationStage::new(source)));
        self
    }

    pub fn with_attestation(mut self, directory: Box<dyn AttestationKeyDirectory>) -> Self {
        self.add_stage(Box::new(AttestationStage::new(directory)));
        self
    }

    pub fn with_anchor(mut self, reader: Box<dyn AnchorReader>) -> Self {
        self.add_stage(Box::new(AnchorStage::new(reader)));
        self
    }

    pub fn with_transparency(mut self, source: Box<dyn InclusionProofSource>) -> Self {
        self.add_stage(Box::new(TransparencyStage::new(source)));
        self
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Verify a signed bundle given as raw JSON.
    ///
    /// `public_key_b64` overrides the key embedded in `signature.signer`.
    pub fn verify_json(
        &self,
        signed: &Value,
        public_key_b64: Option<&str>,
    ) -> Result<VerificationResult, VerifyError> {
        let input = match VerificationInput::from_json(
            signed.clone(),
            public_key_b64,
            self.config.allow_embedded_public_key,
        ) {
            Ok(input) => input,
            Err(error) => {
                warn!(kind = %error.kind, "rejected signed bundle envelope");
                return Ok(VerificationResult::failed(error));
            }
        };
        self.verify_input(&input)
    }

    /// Verify a typed signed bundle.
    pub fn verify_signed(
        &self,
        signed: &SignedBundle,
        public_key_b64: Option<&str>,
    ) -> Result<VerificationResult, VerifyError> {
        match VerificationInput::from_signed(
            signed,
            public_key_b64,
            self.config.allow_embedded_public_key,
        ) {
            Ok(input) => self.verify_input(&input),
            Err(error) => Ok(VerificationResult::failed(error)),
        }
    }

    /// Run the schema boundary and every stage over a prepared input.
    pub fn verify_input(&self, input: &VerificationInput) -> Result<VerificationResult, VerifyError> {
        if let Some(schema) = &self.schema {
            let report = schema.validate("signed_bundle", input.signed());
            if !report.valid {
                warn!(errors = report.errors.len(), "signed bundle failed structural validation");
                let errors = report
                    .errors
                    .into_iter()
                    .map(|message| {
                        VerificationError::new(VerificationErrorKind::StructuralError, message)
                            .with("schema", "signed_bundle")
                    })
                    .collect();
                return Ok(VerificationResult::from_errors(errors));
            }
        }

        let mut stage_results = Vec::with_capacity(self.stages.len());

        for stage in &self.stages {
            let stage_start = Instant::now();

            let outcome = match stage.extension() {
                Some(ext) if !self.config.is_enabled(ext) => {
                    StageOutcome::skip(format!("extension '{ext}' disabled"))
                }
                _ => stage.evaluate(input)?,
            };

            let (passed, skipped, reason) = match &outcome {
                StageOutcome::Pass => (true, false, None),
                StageOutcome::Skip { reason } => (true, true, Some(reason.clone())),
                StageOutcome::Fail(error) => (false, false, Some(error.message.clone())),
            };
            debug!(stage = stage.name(), passed, skipped, "verification stage evaluated");

            stage_results.push(StageResult {
                stage_name: stage.name().to_string(),
                passed,
                skipped,
                reason,
                elapsed: stage_start.elapsed(),
            });

            if let StageOutcome::Fail(error) = outcome {
                warn!(stage = stage.name(), kind = %error.kind, "bundle verification failed");
                let mut result = VerificationResult::failed(error);
                result.stage_results = stage_results;
                return Ok(result);
            }
        }

        let mut result = VerificationResult::verified();
        result.stage_results = stage_results;
        Ok(result)
    }
}

/// Verify with the default pipeline and configuration.
pub fn verify_signed_bundle(
    signed: &Value,
    public_key_b64: Option<&str>,
) -> Result<VerificationResult, VerifyError> {
    BundleVerifier::with_default_stages(VerifierConfig::default()).verify_json(signed, public_key_b64)
}
