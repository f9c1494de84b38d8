use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::VerifyError;

/// Optional verification stages backed by external collaborators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Extension {
    Revocation,
    Attestation,
    Anchor,
    Transparency,
}

impl Extension {
    pub const ALL: [Extension; 4] = [
        Self::Revocation,
        Self::Attestation,
        Self::Anchor,
        Self::Transparency,
    ];
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Revocation => write!(f, "revocation"),
            Self::Attestation => write!(f, "attestation"),
            Self::Anchor => write!(f, "anchor"),
            Self::Transparency => write!(f, "transparency"),
        }
    }
}

/// Configuration for the bundle verifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Fail when `signature.bundle_hash` is absent instead of skipping.
    pub require_bundle_hash: bool,
    /// Fail when `signature.merkle_root` is absent or null instead of
    /// skipping.
    pub require_merkle_root: bool,
    /// Fall back to `signature.signer.public_key_b64` when the caller does
    /// not supply a public key.
    pub allow_embedded_public_key: bool,
    /// Extension stages that run when registered. A registered stage whose
    /// extension is missing here is skipped.
    pub enabled_extensions: Vec<Extension>,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            require_bundle_hash: false,
            require_merkle_root: false,
            allow_embedded_public_key: true,
            enabled_extensions: Extension::ALL.to_vec(),
        }
    }
}

impl VerifierConfig {
    /// Strict profile: both hash fields mandatory, caller-supplied key only.
    pub fn strict() -> Self {
        Self {
            require_bundle_hash: true,
            require_merkle_root: true,
            allow_embedded_public_key: false,
            ..Default::default()
        }
    }

    pub fn is_enabled(&self, extension: Extension) -> bool {
        self.enabled_extensions.contains(&extension)
    }

    /// Parse from a TOML document holding the fields at top level.
    pub fn from_toml_str(s: &str) -> Result<Self, VerifyError> {
        toml::from_str(s).map_err(|e| VerifyError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, VerifyError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| VerifyError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_enables_everything_optional() {
        let config = VerifierConfig::default();
        assert!(!config.require_bundle_hash);
        assert!(!config.require_merkle_root);
        assert!(config.allow_embedded_public_key);
        for ext in Extension::ALL {
            assert!(config.is_enabled(ext));
        }
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = VerifierConfig::from_toml_str(
            r#"
            require_merkle_root = true
            enabled_extensions = ["revocation"]
            "#,
        )
        .unwrap();
        assert!(config.require_merkle_root);
        assert!(config.allow_embedded_public_key);
        assert!(config.is_enabled(Extension::Revocation));
        assert!(!config.is_enabled(Extension::Anchor));
    }

    #[test]
    fn unknown_extension_is_config_error() {
        let err = VerifierConfig::from_toml_str(r#"enabled_extensions = ["telepathy"]"#).unwrap_err();
        assert!(matches!(err, VerifyError::Config(_)));
    }

    #[test]
    fn strict_profile() {
        let config = VerifierConfig::strict();
        assert!(config.require_bundle_hash && config.require_merkle_root);
        assert!(!config.allow_embedded_public_key);
    }
}
