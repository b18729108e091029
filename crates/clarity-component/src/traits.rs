//! The Component trait.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::debug;

use clarity_types::ComponentId;

use crate::error::ActivationError;
use crate::lifecycle::{ActivationGate, DeactivationGate, LifecycleCell, LifecycleState};

/// Read-only status snapshot of a component.
///
/// Produced by [`Component::get_status`]; taking one never mutates state and
/// never blocks on external I/O.
#[derive(Debug, Clone)]
pub struct StatusSnapshot {
    /// Component id.
    pub id: ComponentId,
    /// Component type tag.
    pub type_tag: String,
    /// Current lifecycle state.
    pub state: LifecycleState,
    /// Construction timestamp.
    pub created_at: DateTime<Utc>,
    /// Time spent ACTIVE in the current cycle, if currently ACTIVE.
    pub uptime: Option<Duration>,
    /// Component-specific health fields.
    pub health: Map<String, Value>,
}

/// The lifecycle contract every component variant implements.
///
/// Implementors supply identity, a [`LifecycleCell`], and the
/// `on_activate`/`on_deactivate` hooks; the provided `activate()`,
/// `deactivate()` and `get_status()` run the state machine so transition
/// semantics are identical across variants. The registry holds components
/// behind `Arc<dyn Component>` without inspecting concrete types.
#[async_trait]
pub trait Component: Send + Sync {
    /// Unique id of this instance.
    fn id(&self) -> ComponentId;

    /// Short type tag, e.g. `"pulse"` or `"oversight"`.
    fn type_tag(&self) -> &str;

    /// The embedded lifecycle state cell.
    fn lifecycle(&self) -> &LifecycleCell;

    /// Free-form descriptive metadata.
    fn metadata(&self) -> Map<String, Value> {
        Map::new()
    }

    /// Component-specific health fields included in status snapshots.
    ///
    /// Must not block or mutate state.
    fn health_fields(&self) -> Map<String, Value> {
        Map::new()
    }

    /// Component-specific startup. Runs while the state is ACTIVATING.
    async fn on_activate(&self) -> Result<(), ActivationError>;

    /// Component-specific cleanup. Runs while the state is DEACTIVATING.
    async fn on_deactivate(&self) -> Result<(), ActivationError>;

    /// Activate the component.
    ///
    /// CREATED or STOPPED → ACTIVATING → ACTIVE, or FAILED if the startup
    /// hook errs (the error propagates). Calling while already ACTIVE is an
    /// idempotent success; while ACTIVATING or DEACTIVATING it is a
    /// state-conflict error; while FAILED it demands a `reset()` first.
    async fn activate(&self) -> Result<(), ActivationError> {
        match self.lifecycle().begin_activation()? {
            ActivationGate::AlreadyActive => {
                debug!(id = %self.id(), type_tag = self.type_tag(), "already active");
                Ok(())
            }
            ActivationGate::Proceed => match self.on_activate().await {
                Ok(()) => {
                    self.lifecycle().complete_activation();
                    debug!(id = %self.id(), type_tag = self.type_tag(), "activated");
                    Ok(())
                }
                Err(err) => {
                    self.lifecycle().fail();
                    Err(err)
                }
            },
        }
    }

    /// Deactivate the component.
    ///
    /// ACTIVE → DEACTIVATING → STOPPED. Already-STOPPED is a no-op success.
    /// A cleanup-hook error propagates, but the component still comes to
    /// rest in STOPPED.
    async fn deactivate(&self) -> Result<(), ActivationError> {
        match self.lifecycle().begin_deactivation()? {
            DeactivationGate::AlreadyStopped => Ok(()),
            DeactivationGate::Proceed => {
                let outcome = self.on_deactivate().await;
                self.lifecycle().complete_deactivation();
                debug!(id = %self.id(), type_tag = self.type_tag(), "deactivated");
                outcome
            }
        }
    }

    /// Read-only status snapshot.
    fn get_status(&self) -> StatusSnapshot {
        StatusSnapshot {
            id: self.id(),
            type_tag: self.type_tag().to_string(),
            state: self.lifecycle().state(),
            created_at: self.lifecycle().created_at(),
            uptime: self.lifecycle().uptime(),
            health: self.health_fields(),
        }
    }
}
