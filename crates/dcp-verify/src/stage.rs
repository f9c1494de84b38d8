use crate::config::Extension;
use crate::error::VerifyError;
use crate::input::VerificationInput;
use crate::report::VerificationError;

/// The outcome of a single verification stage.
#[derive(Clone, Debug, PartialEq)]
pub enum StageOutcome {
    /// The check passed; continue with the next stage.
    Pass,
    /// Nothing to check (e.g. an optional field is absent).
    Skip { reason: String },
    /// The bundle failed this check; verification stops here.
    Fail(VerificationError),
}

impl StageOutcome {
    pub fn skip(reason: impl Into<String>) -> Self {
        Self::Skip {
            reason: reason.into(),
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, Self::Fail(_))
    }
}

/// A single check in the verification pipeline.
///
/// Stages run in registration order and the first failure ends the run.
/// The trait is object-safe and `Send + Sync` so a verifier can be shared
/// across threads.
pub trait VerificationStage: Send + Sync {
    /// Short stable name, e.g. `"signature"`.
    fn name(&self) -> &str;

    /// The extension this stage implements, or `None` for the mandatory
    /// protocol steps. Disabled extensions are skipped by the verifier.
    fn extension(&self) -> Option<Extension> {
        None
    }

    fn evaluate(&self, input: &VerificationInput) -> Result<StageOutcome, VerifyError>;
}
