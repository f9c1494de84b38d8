/// Errors that stop verification from running at all.
///
/// A bundle that fails a check is not an error: that outcome is reported
/// in [`crate::VerificationResult`]. These variants cover broken stages,
/// failing collaborators and bad configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    /// A stage could not evaluate its input.
    #[error("stage error in '{stage}': {message}")]
    Stage { stage: String, message: String },

    /// An external collaborator (revocation source, key directory, anchor
    /// reader, proof source) failed to answer.
    #[error("collaborator '{collaborator}' failed: {message}")]
    Collaborator {
        collaborator: String,
        message: String,
    },

    /// Configuration is invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl VerifyError {
    pub fn stage(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Stage {
            stage: stage.into(),
            message: message.into(),
        }
    }

    pub fn collaborator(collaborator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Collaborator {
            collaborator: collaborator.into(),
            message: message.into(),
        }
    }
}
