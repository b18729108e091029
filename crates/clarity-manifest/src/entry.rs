//! Manifest entries.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use clarity_component::Component;
use clarity_types::{ComponentId, RoleTag, TrustLevel};

/// One registered component.
///
/// Holds a reference to the component (the constructor keeps ownership),
/// the classification assigned at registration, and liveness bookkeeping.
pub struct ManifestEntry {
    pub(crate) component: Arc<dyn Component>,
    pub(crate) trust_level: TrustLevel,
    pub(crate) role_tags: HashSet<RoleTag>,
    pub(crate) active: bool,
    pub(crate) last_heartbeat: DateTime<Utc>,
    pub(crate) registered_at: DateTime<Utc>,
    /// Monotonic registration sequence, used to order query results.
    pub(crate) seq: u64,
}

impl ManifestEntry {
    /// The registered component.
    #[must_use]
    pub fn component(&self) -> &Arc<dyn Component> {
        &self.component
    }

    /// Trust level assigned at registration (or after escalation).
    #[must_use]
    pub fn trust_level(&self) -> TrustLevel {
        self.trust_level
    }

    /// Role tags.
    #[must_use]
    pub fn role_tags(&self) -> &HashSet<RoleTag> {
        &self.role_tags
    }

    /// Whether the component is currently marked active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Last heartbeat timestamp.
    #[must_use]
    pub fn last_heartbeat(&self) -> DateTime<Utc> {
        self.last_heartbeat
    }

    /// Registration timestamp.
    #[must_use]
    pub fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }

    /// Plain summary for diagnostics.
    #[must_use]
    pub fn summary(&self) -> EntrySummary {
        let mut role_tags: Vec<RoleTag> = self.role_tags.iter().copied().collect();
        role_tags.sort_by_key(|t| t.as_str());
        EntrySummary {
            id: self.component.id(),
            type_tag: self.component.type_tag().to_string(),
            trust_level: self.trust_level,
            role_tags,
            active: self.active,
            last_heartbeat: self.last_heartbeat,
        }
    }
}

/// Serializable summary of a manifest entry.
#[derive(Debug, Clone, Serialize)]
pub struct EntrySummary {
    /// Component id.
    pub id: ComponentId,
    /// Component type tag.
    pub type_tag: String,
    /// Current trust level.
    pub trust_level: TrustLevel,
    /// Role tags, sorted by label.
    pub role_tags: Vec<RoleTag>,
    /// Active flag.
    pub active: bool,
    /// Last heartbeat.
    pub last_heartbeat: DateTime<Utc>,
}
