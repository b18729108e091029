//! Trust classification.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Ordinal trust classification of a component.
///
/// Controls how much weight a component's output or actions receive.
/// The ordering `Untrusted < Low < Medium < High < Verified` is part of the
/// contract: threshold queries rely on the derived `Ord`.
///
/// Trust is fixed at registration time. Raising it afterwards goes through
/// the manifest's explicit escalation call, never a silent update.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TrustLevel {
    /// No trust established.
    Untrusted,
    /// Minimal trust.
    Low,
    /// Default operating trust.
    Medium,
    /// Elevated trust.
    High,
    /// Fully verified.
    Verified,
}

impl TrustLevel {
    /// Canonical lowercase label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Untrusted => "untrusted",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Verified => "verified",
        }
    }

    /// All levels in ascending order.
    #[must_use]
    pub fn all() -> [TrustLevel; 5] {
        [
            Self::Untrusted,
            Self::Low,
            Self::Medium,
            Self::High,
            Self::Verified,
        ]
    }
}

impl fmt::Display for TrustLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrustLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "untrusted" => Ok(Self::Untrusted),
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "verified" => Ok(Self::Verified),
            other => Err(ConfigError::UnknownTrustLevel(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_is_ordinal() {
        assert!(TrustLevel::Untrusted < TrustLevel::Low);
        assert!(TrustLevel::Low < TrustLevel::Medium);
        assert!(TrustLevel::Medium < TrustLevel::High);
        assert!(TrustLevel::High < TrustLevel::Verified);
    }

    #[test]
    fn test_parse_accepts_any_case() {
        assert_eq!("HIGH".parse::<TrustLevel>().unwrap(), TrustLevel::High);
        assert_eq!("medium".parse::<TrustLevel>().unwrap(), TrustLevel::Medium);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "maximum".parse::<TrustLevel>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownTrustLevel(_)));
    }

    #[test]
    fn test_label_roundtrip() {
        for level in TrustLevel::all() {
            assert_eq!(level.as_str().parse::<TrustLevel>().unwrap(), level);
        }
    }
}
