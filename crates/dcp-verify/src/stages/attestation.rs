use std::collections::HashMap;

use serde_json::Value;

use crate::config::Extension;
use crate::error::VerifyError;
use crate::input::VerificationInput;
use crate::report::{VerificationError, VerificationErrorKind};
use crate::stage::{StageOutcome, VerificationStage};

/// Issuer public keys by jurisdiction.
pub trait AttestationKeyDirectory: Send + Sync {
    /// Base64 Ed25519 key of the issuer for `jurisdiction`.
    fn issuer_key(&self, jurisdiction: &str) -> Result<Option<String>, VerifyError>;
}

/// Fixed jurisdiction to key table.
#[derive(Clone, Debug, Default)]
pub struct StaticKeyDirectory {
    keys: HashMap<String, String>,
}

impl StaticKeyDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, jurisdiction: impl Into<String>, public_key_b64: impl Into<String>) -> Self {
        self.keys.insert(jurisdiction.into(), public_key_b64.into());
        self
    }
}

impl AttestationKeyDirectory for StaticKeyDirectory {
    fn issuer_key(&self, jurisdiction: &str) -> Result<Option<String>, VerifyError> {
        Ok(self.keys.get(jurisdiction).cloned())
    }
}

/// Checks that the human binding record is attested by its jurisdiction.
///
/// The record's `signature` must be a valid signature, by the issuer key
/// for `jurisdiction`, over the canonical record with `signature` removed.
pub struct AttestationStage {
    directory: Box<dyn AttestationKeyDirectory>,
}

impl AttestationStage {
    pub fn new(directory: Box<dyn AttestationKeyDirectory>) -> Self {
        Self { directory }
    }
}

/// The bytes an issuer signs: the record without its `signature` field.
pub fn attestation_payload(record: &Value) -> Value {
    let mut payload = record.clone();
    if let Value::Object(map) = &mut payload {
        map.remove("signature");
    }
    payload
}

impl VerificationStage for AttestationStage {
    fn name(&self) -> &str {
        "attestation"
    }

    fn extension(&self) -> Option<Extension> {
        Some(Extension::Attestation)
    }

    fn evaluate(&self, input: &VerificationInput) -> Result<StageOutcome, VerifyError> {
        let record = input.human_binding_record();
        let invalid = |message: String, jurisdiction: &str| {
            StageOutcome::Fail(
                VerificationError::new(VerificationErrorKind::AttestationInvalid, message)
                    .with("jurisdiction", jurisdiction)
                    .with("human_id", record["human_id"].clone()),
            )
        };

        let Some(jurisdiction) = record["jurisdiction"].as_str() else {
            return Ok(invalid("human binding record has no jurisdiction".into(), ""));
        };
        let Some(issuer_key) = self.directory.issuer_key(jurisdiction)? else {
            return Ok(invalid(
                format!("no attestation issuer known for jurisdiction {jurisdiction}"),
                jurisdiction,
            ));
        };
        let signature = record["signature"].as_str().unwrap_or_default();

        if dcp_crypto::verify(&attestation_payload(record), signature, &issuer_key) {
            Ok(StageOutcome::Pass)
        } else {
            Ok(invalid(
                format!("human binding record is not attested by the {jurisdiction} issuer"),
                jurisdiction,
            ))
        }
    }
}
