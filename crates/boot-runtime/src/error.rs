//! Boot stage errors.

use thiserror::Error;

use clarity_component::ActivationError;
use clarity_types::ConfigError;

use crate::stage::BootStage;

/// Why a stage failed.
#[derive(Debug, Error)]
pub enum StageErrorKind {
    /// Invalid configuration or missing/invalid secret.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A service failed to activate during bring-up.
    #[error(transparent)]
    Activation(#[from] ActivationError),

    /// The stage exceeded its execution budget.
    #[error("stage exceeded its {0}s budget")]
    Timeout(u64),

    /// Boot was aborted before the stage started.
    #[error("boot aborted before stage start")]
    Aborted,

    /// A smoke check found a brought-up service unhealthy.
    #[error("smoke check failed: {0}")]
    Smoke(String),

    /// Anything else.
    #[error("{0}")]
    Internal(String),
}

/// A stage failure: the stage's position plus the underlying cause.
///
/// Surfaces to the caller as a structured error; the orchestrator never
/// retries — that decision belongs to an external supervisor.
#[derive(Debug, Error)]
#[error("stage {index} ({name}) failed: {kind}")]
pub struct StageError {
    /// Zero-based stage index.
    pub index: usize,
    /// Stage name.
    pub name: &'static str,
    /// Underlying cause.
    #[source]
    pub kind: StageErrorKind,
}

impl StageError {
    /// Attach a cause to a stage.
    #[must_use]
    pub fn new(stage: BootStage, kind: impl Into<StageErrorKind>) -> Self {
        Self {
            index: stage.index(),
            name: stage.name(),
            kind: kind.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_stage_position() {
        let err = StageError::new(
            BootStage::SchemaSecretValidation,
            StageErrorKind::Config(ConfigError::MissingSecret("CLARITY_SIGNING_SECRET")),
        );
        let text = err.to_string();
        assert!(text.contains("stage 2"));
        assert!(text.contains("schema-secret-validation"));
        assert!(text.contains("CLARITY_SIGNING_SECRET"));
    }
}
