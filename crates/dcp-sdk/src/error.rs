use dcp_crypto::{CanonicalError, ChainError, SignatureError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    /// A required bundle artifact was never set.
    #[error("missing {0}")]
    MissingArtifact(&'static str),

    #[error("at least one audit entry is required")]
    NoAuditEntries,

    /// The signature's `bundle_hash` is not the hash of the bundle it carries.
    #[error("bundle hash mismatch: signature claims {claimed}, bundle hashes to {actual}")]
    BundleHashMismatch { claimed: String, actual: String },

    #[error("hash error: {0}")]
    Hash(#[from] CanonicalError),

    #[error("audit chain error: {0}")]
    Chain(#[from] ChainError),

    #[error("signature error: {0}")]
    Signature(#[from] SignatureError),

    #[error("verification error: {0}")]
    Verify(#[from] dcp_verify::VerifyError),

    #[error("log error: {0}")]
    Log(#[from] dcp_log::LogError),
}

pub type SdkResult<T> = Result<T, SdkError>;
