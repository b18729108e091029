//! Configuration and registration errors.

use thiserror::Error;

use crate::id::ComponentId;
use crate::trust::TrustLevel;

/// Rejection of invalid registration or configuration input.
///
/// A `ConfigError` always rejects the whole operation — no partial entry or
/// partially-applied setting is ever left behind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Trust label outside the recognized ordinal vocabulary.
    #[error("unrecognized trust level {0:?}")]
    UnknownTrustLevel(String),

    /// Role label outside the recognized vocabulary.
    #[error("unrecognized role tag {0:?}")]
    UnknownRoleTag(String),

    /// A component with this id is already registered.
    #[error("component {0} is already registered")]
    DuplicateComponent(ComponentId),

    /// No component with this id is registered.
    #[error("component {0} is not registered")]
    UnknownComponent(ComponentId),

    /// Trust may only be raised, and only through the escalation call.
    #[error(
        "trust for component {id} can only be raised (current {current}, requested {requested})"
    )]
    TrustNotRaised {
        /// The component whose trust was to change.
        id: ComponentId,
        /// Its current level.
        current: TrustLevel,
        /// The rejected requested level.
        requested: TrustLevel,
    },

    /// A required secret is absent from the secrets source.
    #[error("required secret {0} is missing")]
    MissingSecret(&'static str),

    /// A secret is present but malformed.
    #[error("secret {name} is invalid: {reason}")]
    InvalidSecret {
        /// Secret name.
        name: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// A configuration value is out of its accepted range or shape.
    #[error("invalid configuration for {name}: {reason}")]
    InvalidValue {
        /// Setting name.
        name: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_label() {
        let err = ConfigError::UnknownRoleTag("telemetry".to_string());
        assert!(err.to_string().contains("telemetry"));
    }

    #[test]
    fn test_trust_not_raised_display() {
        let err = ConfigError::TrustNotRaised {
            id: ComponentId::new(),
            current: TrustLevel::High,
            requested: TrustLevel::Low,
        };
        let text = err.to_string();
        assert!(text.contains("high"));
        assert!(text.contains("low"));
    }
}
