//! Process-scoped runtime context.

use std::sync::Arc;

use clarity_bus::{BusConfig, EventBus};
use clarity_manifest::Manifest;

/// The shared infrastructure of one runtime process: the event bus and the
/// component manifest.
///
/// Constructed exactly once at boot and passed to every component and
/// orchestrator stage — single-instance-per-process semantics without
/// hidden global mutable state. Clones share the same bus and manifest.
#[derive(Clone)]
pub struct RuntimeContext {
    bus: EventBus,
    manifest: Arc<Manifest>,
}

impl RuntimeContext {
    /// Build the context with the given bus tuning.
    #[must_use]
    pub fn new(bus_config: BusConfig) -> Self {
        Self {
            bus: EventBus::with_config(bus_config),
            manifest: Arc::new(Manifest::new()),
        }
    }

    /// The event bus.
    #[must_use]
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// The component manifest.
    #[must_use]
    pub fn manifest(&self) -> &Arc<Manifest> {
        &self.manifest
    }
}

impl Default for RuntimeContext {
    fn default() -> Self {
        Self::new(BusConfig::default())
    }
}
