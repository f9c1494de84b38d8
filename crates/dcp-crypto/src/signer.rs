//! Ed25519 detached signatures over canonical JSON.
//!
//! Keys and signatures travel as standard base64. A secret key is accepted
//! either as the bare 32-byte seed or as the 64-byte `seed || public` form
//! that [`generate_keypair`] emits.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ed25519_dalek::{Signer, Verifier};
use serde::{Deserialize, Serialize};

use crate::canonical::canonicalize;

/// Ed25519 signing key (private).
pub struct SigningKey(ed25519_dalek::SigningKey);

/// Ed25519 verifying key (public).
#[derive(Clone, PartialEq, Eq)]
pub struct VerifyingKey(ed25519_dalek::VerifyingKey);

/// Base64-encoded key pair as written by `dcp keygen`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keypair {
    pub public_key_b64: String,
    /// 64 bytes: seed followed by the public key.
    pub secret_key_b64: String,
}

impl SigningKey {
    /// Generate a new random signing key.
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        Self(ed25519_dalek::SigningKey::generate(&mut csprng))
    }

    /// Create from a raw 32-byte seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self(ed25519_dalek::SigningKey::from_bytes(&seed))
    }

    /// Decode a base64 secret key in either accepted length.
    pub fn from_b64(secret_key_b64: &str) -> Result<Self, SignatureError> {
        let bytes = STANDARD
            .decode(secret_key_b64.trim())
            .map_err(|e| SignatureError::Encoding(e.to_string()))?;
        match bytes.len() {
            32 => {
                let mut seed = [0u8; 32];
                seed.copy_from_slice(&bytes);
                Ok(Self::from_seed(seed))
            }
            64 => {
                let keypair: [u8; 64] = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| SignatureError::InvalidKey)?;
                // Rejects a public half that does not belong to the seed.
                ed25519_dalek::SigningKey::from_keypair_bytes(&keypair)
                    .map(Self)
                    .map_err(|_| SignatureError::InvalidKey)
            }
            actual => Err(SignatureError::InvalidKeyLength { actual }),
        }
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        VerifyingKey(self.0.verifying_key())
    }

    /// Sign raw bytes, returning the base64 signature.
    pub fn sign_bytes(&self, message: &[u8]) -> String {
        STANDARD.encode(self.0.sign(message).to_bytes())
    }

    /// 64-byte `seed || public` form, base64.
    pub fn to_keypair_b64(&self) -> String {
        STANDARD.encode(self.0.to_keypair_bytes())
    }
}

impl VerifyingKey {
    pub fn from_b64(public_key_b64: &str) -> Result<Self, SignatureError> {
        let bytes = STANDARD
            .decode(public_key_b64.trim())
            .map_err(|e| SignatureError::Encoding(e.to_string()))?;
        let bytes: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| SignatureError::InvalidKeyLength { actual: bytes.len() })?;
        ed25519_dalek::VerifyingKey::from_bytes(&bytes)
            .map(Self)
            .map_err(|_| SignatureError::InvalidKey)
    }

    pub fn to_b64(&self) -> String {
        STANDARD.encode(self.0.to_bytes())
    }

    /// Verify a base64 signature over raw bytes.
    pub fn verify_bytes(&self, message: &[u8], sig_b64: &str) -> Result<(), SignatureError> {
        let bytes = STANDARD
            .decode(sig_b64.trim())
            .map_err(|e| SignatureError::Encoding(e.to_string()))?;
        let bytes: [u8; 64] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| SignatureError::InvalidSignature)?;
        let signature = ed25519_dalek::Signature::from_bytes(&bytes);
        self.0
            .verify(message, &signature)
            .map_err(|_| SignatureError::InvalidSignature)
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SigningKey(<redacted>)")
    }
}

impl std::fmt::Debug for VerifyingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VerifyingKey({})", hex::encode(self.0.to_bytes()))
    }
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keypair")
            .field("public_key_b64", &self.public_key_b64)
            .field("secret_key_b64", &"<redacted>")
            .finish()
    }
}

/// Generate a fresh key pair from the OS CSPRNG.
pub fn generate_keypair() -> Keypair {
    let sk = SigningKey::generate();
    Keypair {
        public_key_b64: sk.verifying_key().to_b64(),
        secret_key_b64: sk.to_keypair_b64(),
    }
}

/// Detached signature over `canonicalize(value)`.
pub fn sign<T: Serialize + ?Sized>(value: &T, secret_key_b64: &str) -> Result<String, SignatureError> {
    let sk = SigningKey::from_b64(secret_key_b64)?;
    let message = canonicalize(value).map_err(|e| SignatureError::Canonical(e.to_string()))?;
    Ok(sk.sign_bytes(&message))
}

/// Check a detached signature over `canonicalize(value)`.
///
/// Any malformed input (bad base64, wrong lengths, unhashable value) yields
/// `false`; this never errors.
pub fn verify<T: Serialize + ?Sized>(value: &T, sig_b64: &str, public_key_b64: &str) -> bool {
    let Ok(vk) = VerifyingKey::from_b64(public_key_b64) else {
        return false;
    };
    let Ok(message) = canonicalize(value) else {
        return false;
    };
    vk.verify_bytes(&message, sig_b64).is_ok()
}

/// Public key belonging to a base64 secret key.
pub fn public_key_from_secret(secret_key_b64: &str) -> Result<String, SignatureError> {
    Ok(SigningKey::from_b64(secret_key_b64)?.verifying_key().to_b64())
}

/// Errors from signing operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("invalid key")]
    InvalidKey,
    #[error("invalid key length: {actual} bytes")]
    InvalidKeyLength { actual: usize },
    #[error("invalid base64: {0}")]
    Encoding(String),
    #[error("cannot canonicalize value: {0}")]
    Canonical(String),
}
