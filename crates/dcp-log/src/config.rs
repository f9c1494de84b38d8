use std::path::{Path, PathBuf};

use dcp_crypto::MerkleMode;
use serde::{Deserialize, Serialize};

use crate::error::{LogError, Result};

/// Flush/sync strategy for the file store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// `fsync` after every append.
    EveryWrite,
    /// Flush to the OS and rely on page-cache write-back.
    #[default]
    OsDefault,
}

/// Configuration for a transparency log.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Tree construction. Changing it for an existing log changes every
    /// root and proof it serves.
    pub merkle_mode: MerkleMode,
    pub sync_mode: SyncMode,
    /// Backing file; `None` keeps the log in memory.
    pub path: Option<PathBuf>,
}

impl LogConfig {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Default::default()
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| LogError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| LogError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }
}
