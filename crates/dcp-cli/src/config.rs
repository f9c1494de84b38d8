use std::path::Path;

use anyhow::Context;
use dcp_log::LogConfig;
use dcp_verify::VerifierConfig;
use serde::{Deserialize, Serialize};

/// `--config` file: one table per subsystem, both optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub verifier: VerifierConfig,
    pub log: LogConfig,
}

impl CliConfig {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}
