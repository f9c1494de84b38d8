use std::io;

/// Errors produced by the transparency log and its stores.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// Requested a proof or entry past the end of the log.
    #[error("index {index} out of range for log of size {size}")]
    IndexOutOfRange { index: u64, size: u64 },

    /// The value to log is not a `"sha256:<hex>"` bundle hash.
    #[error("invalid bundle hash '{0}': expected sha256:<64 hex chars>")]
    InvalidBundleHash(String),

    /// Stored entries do not form a contiguous, self-consistent log.
    #[error("log integrity violation at index {index}: {reason}")]
    IntegrityViolation { index: u64, reason: String },

    /// Another store already holds the log file.
    #[error("log file {path} is locked by another writer: {reason}")]
    Locked { path: String, reason: String },

    /// I/O error in a file-backed store.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A store-level failure that is not plain I/O.
    #[error("store error: {0}")]
    Store(String),

    /// Configuration is invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl LogError {
    pub(crate) fn poisoned(what: &str) -> Self {
        Self::Store(format!("{what} lock poisoned"))
    }

    /// Stable name for wire error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::IndexOutOfRange { .. } => "IndexOutOfRange",
            Self::InvalidBundleHash(_) => "InvalidBundleHash",
            Self::IntegrityViolation { .. } => "IntegrityViolation",
            Self::Locked { .. } => "Locked",
            Self::Io(_) => "Io",
            Self::Serialization(_) => "Serialization",
            Self::Store(_) => "Store",
            Self::Config(_) => "Config",
        }
    }
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, LogError>;
