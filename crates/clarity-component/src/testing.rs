//! Test support.
//!
//! [`ProbeComponent`] is a minimal component used across the workspace's
//! test suites: it counts hook invocations and can be configured to fail
//! either hook, which is enough to exercise every lifecycle path.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::{Map, Value};

use clarity_types::ComponentId;

use crate::error::ActivationError;
use crate::lifecycle::LifecycleCell;
use crate::traits::Component;

/// A counting probe component for tests.
pub struct ProbeComponent {
    id: ComponentId,
    type_tag: String,
    cell: LifecycleCell,
    activations: AtomicU64,
    deactivations: AtomicU64,
    fail_activate: bool,
    fail_deactivate: bool,
}

impl ProbeComponent {
    /// A probe that activates and deactivates cleanly.
    #[must_use]
    pub fn new(type_tag: impl Into<String>) -> Self {
        Self {
            id: ComponentId::new(),
            type_tag: type_tag.into(),
            cell: LifecycleCell::new(),
            activations: AtomicU64::new(0),
            deactivations: AtomicU64::new(0),
            fail_activate: false,
            fail_deactivate: false,
        }
    }

    /// A probe whose startup hook fails.
    #[must_use]
    pub fn failing(type_tag: impl Into<String>) -> Self {
        Self {
            fail_activate: true,
            ..Self::new(type_tag)
        }
    }

    /// A probe whose cleanup hook fails.
    #[must_use]
    pub fn failing_shutdown(type_tag: impl Into<String>) -> Self {
        Self {
            fail_deactivate: true,
            ..Self::new(type_tag)
        }
    }

    /// Number of completed startup-hook runs.
    #[must_use]
    pub fn activations(&self) -> u64 {
        self.activations.load(Ordering::Relaxed)
    }

    /// Number of completed cleanup-hook runs.
    #[must_use]
    pub fn deactivations(&self) -> u64 {
        self.deactivations.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Component for ProbeComponent {
    fn id(&self) -> ComponentId {
        self.id
    }

    fn type_tag(&self) -> &str {
        &self.type_tag
    }

    fn lifecycle(&self) -> &LifecycleCell {
        &self.cell
    }

    fn health_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("activations".to_string(), Value::from(self.activations()));
        fields
    }

    async fn on_activate(&self) -> Result<(), ActivationError> {
        if self.fail_activate {
            return Err(ActivationError::startup("probe configured to fail"));
        }
        self.activations.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn on_deactivate(&self) -> Result<(), ActivationError> {
        if self.fail_deactivate {
            return Err(ActivationError::shutdown("probe configured to fail"));
        }
        self.deactivations.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
