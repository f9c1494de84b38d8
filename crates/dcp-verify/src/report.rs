use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Why a bundle failed verification. Serialized as the variant name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerificationErrorKind {
    StructuralError,
    SignatureInvalid,
    BundleHashMismatch,
    MerkleRootMismatch,
    IntentHashMismatch,
    PrevHashChainMismatch,
    MissingPublicKey,
    MalformedSignedBundle,
    IndexOutOfRange,
    AgentRevoked,
    AttestationInvalid,
    AnchorMismatch,
    TransparencyProofInvalid,
}

impl fmt::Display for VerificationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One verification failure: `{kind, message, context}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VerificationError {
    pub kind: VerificationErrorKind,
    pub message: String,
    /// Always a JSON object.
    #[serde(default = "empty_object")]
    pub context: Value,
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

impl VerificationError {
    pub fn new(kind: VerificationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: empty_object(),
        }
    }

    /// Attach one context field.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        if let Value::Object(map) = &mut self.context {
            map.insert(key.to_string(), value.into());
        }
        self
    }

    /// Mismatch error carrying `expected` and `actual`.
    pub fn mismatch(
        kind: VerificationErrorKind,
        message: impl Into<String>,
        expected: impl Into<Value>,
        actual: impl Into<Value>,
    ) -> Self {
        Self::new(kind, message)
            .with("expected", expected)
            .with("actual", actual)
    }
}

impl fmt::Display for VerificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Per-stage record kept for diagnostics. Not part of the wire result.
#[derive(Clone, Debug, PartialEq)]
pub struct StageResult {
    pub stage_name: String,
    pub passed: bool,
    pub skipped: bool,
    pub reason: Option<String>,
    pub elapsed: Duration,
}

/// Outcome of verifying one signed bundle: `{verified, errors}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub verified: bool,
    pub errors: Vec<VerificationError>,
    #[serde(skip)]
    pub stage_results: Vec<StageResult>,
}

impl VerificationResult {
    pub fn verified() -> Self {
        Self {
            verified: true,
            ..Default::default()
        }
    }

    pub fn failed(error: VerificationError) -> Self {
        Self::from_errors(vec![error])
    }

    /// Verified iff `errors` is empty.
    pub fn from_errors(errors: Vec<VerificationError>) -> Self {
        Self {
            verified: errors.is_empty(),
            errors,
            stage_results: Vec::new(),
        }
    }

    /// Kind of the first failure, if any.
    pub fn first_kind(&self) -> Option<VerificationErrorKind> {
        self.errors.first().map(|e| e.kind)
    }
}
