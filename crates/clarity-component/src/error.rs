//! Lifecycle errors.

use thiserror::Error;

use crate::lifecycle::LifecycleState;

/// Failure of a lifecycle operation.
///
/// `Startup` and `Shutdown` carry component-specific causes out of the
/// hooks; the state-machine variants reject calls that arrive in the wrong
/// state. Errors are never swallowed — the caller always sees them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActivationError {
    /// The operation is not legal in the current state.
    #[error("cannot {attempted} while {current}")]
    StateConflict {
        /// State the component was in.
        current: LifecycleState,
        /// The attempted operation.
        attempted: &'static str,
    },

    /// A FAILED component must be reset before re-activation.
    #[error("component is failed; reset() is required before re-activation")]
    ResetRequired,

    /// Component-specific startup failed; the component is now FAILED.
    #[error("startup failed: {0}")]
    Startup(String),

    /// Component-specific cleanup failed; the component still stops.
    #[error("shutdown failed: {0}")]
    Shutdown(String),
}

impl ActivationError {
    /// Startup failure with a message.
    #[must_use]
    pub fn startup(message: impl Into<String>) -> Self {
        Self::Startup(message.into())
    }

    /// Shutdown failure with a message.
    #[must_use]
    pub fn shutdown(message: impl Into<String>) -> Self {
        Self::Shutdown(message.into())
    }
}
