//! The registry.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, info};

use clarity_component::Component;
use clarity_types::{ComponentId, ConfigError, RoleTag, TrustLevel};

use crate::entry::{EntrySummary, ManifestEntry};

struct ManifestInner {
    entries: HashMap<ComponentId, ManifestEntry>,
    next_seq: u64,
}

/// Authoritative store of component instances.
///
/// Component ids are the primary key; one entry per id for the lifetime of
/// the process. See the crate docs for the locking discipline.
pub struct Manifest {
    inner: RwLock<ManifestInner>,
}

impl Manifest {
    /// Create an empty manifest.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(ManifestInner {
                entries: HashMap::new(),
                next_seq: 0,
            }),
        }
    }

    /// Register a component with its trust level and role tags.
    ///
    /// The entry starts with `active = false`; activation is reported
    /// separately via [`Manifest::update_status`]. A duplicate id rejects
    /// the call and leaves the existing entry untouched.
    pub fn register(
        &self,
        component: Arc<dyn Component>,
        trust_level: TrustLevel,
        role_tags: &[RoleTag],
    ) -> Result<(), ConfigError> {
        let id = component.id();
        let mut inner = self.inner.write();

        if inner.entries.contains_key(&id) {
            return Err(ConfigError::DuplicateComponent(id));
        }

        let now = Utc::now();
        let seq = inner.next_seq;
        inner.next_seq += 1;

        info!(
            id = %id,
            type_tag = component.type_tag(),
            trust = %trust_level,
            "component registered"
        );

        inner.entries.insert(
            id,
            ManifestEntry {
                component,
                trust_level,
                role_tags: role_tags.iter().copied().collect(),
                active: false,
                last_heartbeat: now,
                registered_at: now,
                seq,
            },
        );

        Ok(())
    }

    /// Register from string labels, validating them against the vocabulary.
    ///
    /// This is the boundary for callers holding configuration text: an
    /// unrecognized trust label or role label rejects the whole call and no
    /// entry is created.
    pub fn register_from_labels(
        &self,
        component: Arc<dyn Component>,
        trust_level: &str,
        role_tags: &[&str],
    ) -> Result<(), ConfigError> {
        let trust: TrustLevel = trust_level.parse()?;
        let roles = role_tags
            .iter()
            .map(|label| label.parse())
            .collect::<Result<Vec<RoleTag>, ConfigError>>()?;
        self.register(component, trust, &roles)
    }

    /// Toggle the active flag and refresh the heartbeat.
    pub fn update_status(&self, component_id: ComponentId, active: bool) -> Result<(), ConfigError> {
        let mut inner = self.inner.write();
        let entry = inner
            .entries
            .get_mut(&component_id)
            .ok_or(ConfigError::UnknownComponent(component_id))?;

        entry.active = active;
        entry.last_heartbeat = Utc::now();
        debug!(id = %component_id, active, "component status updated");
        Ok(())
    }

    /// Refresh the heartbeat without touching the active flag.
    ///
    /// Called directly by liveness observers — never routed through the
    /// event bus, so heartbeats are not gated behind delivery latency.
    pub fn heartbeat(&self, component_id: ComponentId) -> Result<(), ConfigError> {
        let mut inner = self.inner.write();
        let entry = inner
            .entries
            .get_mut(&component_id)
            .ok_or(ConfigError::UnknownComponent(component_id))?;

        entry.last_heartbeat = Utc::now();
        Ok(())
    }

    /// Privileged re-registration that raises a component's trust level.
    ///
    /// The new level must be strictly higher than the current one; trust is
    /// never lowered and never changed silently.
    pub fn escalate_trust(
        &self,
        component_id: ComponentId,
        new_level: TrustLevel,
    ) -> Result<(), ConfigError> {
        let mut inner = self.inner.write();
        let entry = inner
            .entries
            .get_mut(&component_id)
            .ok_or(ConfigError::UnknownComponent(component_id))?;

        if new_level <= entry.trust_level {
            return Err(ConfigError::TrustNotRaised {
                id: component_id,
                current: entry.trust_level,
                requested: new_level,
            });
        }

        info!(
            id = %component_id,
            from = %entry.trust_level,
            to = %new_level,
            "trust escalated"
        );
        entry.trust_level = new_level;
        Ok(())
    }

    /// Look up a component by id.
    #[must_use]
    pub fn get(&self, component_id: ComponentId) -> Option<Arc<dyn Component>> {
        self.inner
            .read()
            .entries
            .get(&component_id)
            .map(|entry| Arc::clone(&entry.component))
    }

    /// Summary of a single entry.
    #[must_use]
    pub fn entry_summary(&self, component_id: ComponentId) -> Option<EntrySummary> {
        self.inner
            .read()
            .entries
            .get(&component_id)
            .map(ManifestEntry::summary)
    }

    /// Components with `active = true`, in registration order.
    #[must_use]
    pub fn get_active_components(&self) -> Vec<Arc<dyn Component>> {
        self.collect_ordered(|entry| entry.active)
    }

    /// Components whose role tag set contains `tag`, in registration order.
    #[must_use]
    pub fn get_components_by_role(&self, tag: RoleTag) -> Vec<Arc<dyn Component>> {
        self.collect_ordered(|entry| entry.role_tags.contains(&tag))
    }

    /// Components at exactly `level`, in registration order.
    ///
    /// Exact match by design; see
    /// [`Manifest::get_components_by_trust_at_least`] for the threshold
    /// form.
    #[must_use]
    pub fn get_components_by_trust(&self, level: TrustLevel) -> Vec<Arc<dyn Component>> {
        self.collect_ordered(|entry| entry.trust_level == level)
    }

    /// Components at `level` or above, in registration order.
    #[must_use]
    pub fn get_components_by_trust_at_least(&self, level: TrustLevel) -> Vec<Arc<dyn Component>> {
        self.collect_ordered(|entry| entry.trust_level >= level)
    }

    /// Summaries of every entry, in registration order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<EntrySummary> {
        let inner = self.inner.read();
        let mut entries: Vec<&ManifestEntry> = inner.entries.values().collect();
        entries.sort_by_key(|entry| entry.seq);
        entries.into_iter().map(ManifestEntry::summary).collect()
    }

    /// Number of registered components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    /// Whether the manifest is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }

    /// Role tags of a component, if registered.
    #[must_use]
    pub fn roles_of(&self, component_id: ComponentId) -> Option<HashSet<RoleTag>> {
        self.inner
            .read()
            .entries
            .get(&component_id)
            .map(|entry| entry.role_tags.clone())
    }

    fn collect_ordered(
        &self,
        predicate: impl Fn(&ManifestEntry) -> bool,
    ) -> Vec<Arc<dyn Component>> {
        let inner = self.inner.read();
        let mut matched: Vec<&ManifestEntry> =
            inner.entries.values().filter(|e| predicate(e)).collect();
        matched.sort_by_key(|entry| entry.seq);
        matched
            .into_iter()
            .map(|entry| Arc::clone(&entry.component))
            .collect()
    }
}

impl Default for Manifest {
    fn default() -> Self {
        Self::new()
    }
}
