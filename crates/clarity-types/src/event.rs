//! Event envelope.
//!
//! Events are the only way components learn about each other's activity.
//! The envelope is deliberately plain — a type string, a source id, a JSON
//! payload, a timestamp, and an optional correlation id linking related
//! events (request/response pairs, stage announcements for one boot run).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::id::ComponentId;

/// Well-known event types published by the framework itself.
pub mod well_known {
    /// A component finished activation and is ACTIVE.
    pub const COMPONENT_ACTIVATED: &str = "component.activated";
    /// A component's activation failed; it is FAILED.
    pub const COMPONENT_FAILED: &str = "component.failed";
    /// A component was deactivated and is STOPPED.
    pub const COMPONENT_DEACTIVATED: &str = "component.deactivated";
    /// A boot stage completed successfully.
    pub const BOOT_STAGE_COMPLETED: &str = "boot.stage.completed";
    /// A boot stage failed; the pipeline halts.
    pub const BOOT_STAGE_FAILED: &str = "boot.stage.failed";
    /// A processing loop reached a terminal state.
    pub const LOOP_COMPLETED: &str = "loop.completed";
}

/// An event published on the bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Event type, matched exactly by default subscriptions.
    pub event_type: String,
    /// Component that published the event.
    pub source: ComponentId,
    /// Free-form payload.
    pub payload: Map<String, Value>,
    /// Publish timestamp.
    pub timestamp: DateTime<Utc>,
    /// Optional id linking related events.
    pub correlation_id: Option<Uuid>,
}

impl Event {
    /// Create an event with an empty payload, stamped now.
    #[must_use]
    pub fn new(event_type: impl Into<String>, source: ComponentId) -> Self {
        Self {
            event_type: event_type.into(),
            source,
            payload: Map::new(),
            timestamp: Utc::now(),
            correlation_id: None,
        }
    }

    /// Add a payload field.
    #[must_use]
    pub fn with_payload(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// Attach a correlation id.
    #[must_use]
    pub fn with_correlation(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }
}
