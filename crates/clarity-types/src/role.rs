//! Role tag vocabulary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Validated vocabulary of component roles.
///
/// Registration rejects labels outside this vocabulary so that role queries
/// cannot silently miss because of a typo'd freeform tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleTag {
    /// Stores and recalls context for other components.
    Memory,
    /// Runs inference or decision logic.
    Reasoning,
    /// Observes external inputs.
    Perception,
    /// Routes or delivers messages.
    Messaging,
    /// Drives periodic or deferred work.
    Scheduling,
    /// Watches other components for failures.
    Oversight,
    /// Produces diagnostic reports.
    Diagnostics,
    /// Owns durable data access.
    Storage,
}

impl RoleTag {
    /// Canonical lowercase label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Reasoning => "reasoning",
            Self::Perception => "perception",
            Self::Messaging => "messaging",
            Self::Scheduling => "scheduling",
            Self::Oversight => "oversight",
            Self::Diagnostics => "diagnostics",
            Self::Storage => "storage",
        }
    }

    /// The full vocabulary.
    #[must_use]
    pub fn all() -> [RoleTag; 8] {
        [
            Self::Memory,
            Self::Reasoning,
            Self::Perception,
            Self::Messaging,
            Self::Scheduling,
            Self::Oversight,
            Self::Diagnostics,
            Self::Storage,
        ]
    }
}

impl fmt::Display for RoleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleTag {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "reasoning" => Ok(Self::Reasoning),
            "perception" => Ok(Self::Perception),
            "messaging" => Ok(Self::Messaging),
            "scheduling" => Ok(Self::Scheduling),
            "oversight" => Ok(Self::Oversight),
            "diagnostics" => Ok(Self::Diagnostics),
            "storage" => Ok(Self::Storage),
            other => Err(ConfigError::UnknownRoleTag(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_roundtrip() {
        for tag in RoleTag::all() {
            assert_eq!(tag.as_str().parse::<RoleTag>().unwrap(), tag);
        }
    }

    #[test]
    fn test_parse_rejects_freeform() {
        let err = "telemetry".parse::<RoleTag>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownRoleTag(_)));
    }
}
