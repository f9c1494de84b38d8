use dcp_types::SignedBundle;
use serde_json::Value;

use crate::report::{VerificationError, VerificationErrorKind};

/// A signed bundle accepted for verification.
///
/// Holds the raw JSON exactly as received: every hash and signature check
/// runs over these bytes, never over a re-serialized typed copy, so fields
/// a typed model would drop still count.
#[derive(Clone, Debug)]
pub struct VerificationInput {
    signed: Value,
    public_key_b64: String,
}

impl VerificationInput {
    /// Check the envelope and resolve the public key.
    ///
    /// Fails with `MalformedSignedBundle` when `bundle`, `signature` or
    /// `signature.sig_b64` is missing, and with `MissingPublicKey` when no
    /// explicit key is given and the embedded one is absent or not allowed.
    pub fn from_json(
        signed: Value,
        public_key_b64: Option<&str>,
        allow_embedded_public_key: bool,
    ) -> Result<Self, VerificationError> {
        let malformed = |what: &str| {
            VerificationError::new(
                VerificationErrorKind::MalformedSignedBundle,
                format!("signed bundle is missing {what}"),
            )
            .with("field", what)
        };

        if !signed.get("bundle").is_some_and(Value::is_object) {
            return Err(malformed("bundle"));
        }
        let Some(signature) = signed.get("signature").filter(|s| s.is_object()) else {
            return Err(malformed("signature"));
        };
        if !signature.get("sig_b64").is_some_and(Value::is_string) {
            return Err(malformed("signature.sig_b64"));
        }

        let embedded = signature
            .pointer("/signer/public_key_b64")
            .and_then(Value::as_str)
            .filter(|_| allow_embedded_public_key);
        let key = public_key_b64
            .or(embedded)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                VerificationError::new(
                    VerificationErrorKind::MissingPublicKey,
                    "no public key supplied and none usable in signature.signer",
                )
            })?
            .trim()
            .to_string();

        Ok(Self {
            signed,
            public_key_b64: key,
        })
    }

    /// Same as [`Self::from_json`] for a typed bundle.
    pub fn from_signed(
        signed: &SignedBundle,
        public_key_b64: Option<&str>,
        allow_embedded_public_key: bool,
    ) -> Result<Self, VerificationError> {
        let value = serde_json::to_value(signed).map_err(|e| {
            VerificationError::new(VerificationErrorKind::MalformedSignedBundle, e.to_string())
        })?;
        Self::from_json(value, public_key_b64, allow_embedded_public_key)
    }

    /// The whole signed bundle.
    pub fn signed(&self) -> &Value {
        &self.signed
    }

    /// The citizenship bundle: the signed and hashed object.
    pub fn bundle(&self) -> &Value {
        &self.signed["bundle"]
    }

    pub fn signature(&self) -> &Value {
        &self.signed["signature"]
    }

    pub fn sig_b64(&self) -> &str {
        self.signature()["sig_b64"].as_str().unwrap_or_default()
    }

    pub fn public_key_b64(&self) -> &str {
        &self.public_key_b64
    }

    /// `signature.bundle_hash` if present (may be any JSON type).
    pub fn claimed_bundle_hash(&self) -> Option<&Value> {
        self.signature().get("bundle_hash")
    }

    /// `signature.merkle_root` if present and not null.
    pub fn claimed_merkle_root(&self) -> Option<&Value> {
        self.signature().get("merkle_root").filter(|v| !v.is_null())
    }

    pub fn intent(&self) -> &Value {
        &self.bundle()["intent"]
    }

    /// Audit entries; a missing or non-array field reads as empty.
    pub fn audit_entries(&self) -> &[Value] {
        self.bundle()["audit_entries"]
            .as_array()
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn human_binding_record(&self) -> &Value {
        &self.bundle()["human_binding_record"]
    }

    pub fn agent_id(&self) -> Option<&str> {
        self.bundle()
            .pointer("/agent_passport/agent_id")
            .and_then(Value::as_str)
    }
}
