//! Lifecycle state machine.

use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::ActivationError;

/// Lifecycle status of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    /// Constructed, never activated.
    Created,
    /// Running component-specific startup.
    Activating,
    /// Running normally.
    Active,
    /// Running component-specific cleanup.
    Deactivating,
    /// Stopped gracefully. May re-enter via `activate()`.
    Stopped,
    /// Startup or runtime failure. Requires `reset()` before re-activation.
    Failed,
}

impl LifecycleState {
    /// Canonical lowercase label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Activating => "activating",
            Self::Active => "active",
            Self::Deactivating => "deactivating",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
        }
    }

    /// Whether this state ends the current cycle.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped | Self::Failed)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of `begin_activation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationGate {
    /// Transitioned to ACTIVATING; run the startup hook.
    Proceed,
    /// Already ACTIVE; idempotent success, skip the hook.
    AlreadyActive,
}

/// Outcome of `begin_deactivation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeactivationGate {
    /// Transitioned to DEACTIVATING; run the cleanup hook.
    Proceed,
    /// Already STOPPED; no-op success, skip the hook.
    AlreadyStopped,
}

struct CellInner {
    state: LifecycleState,
    activated_at: Option<Instant>,
}

/// Shared state cell driving the lifecycle state machine.
///
/// Every component embeds one and exposes it via [`crate::Component::lifecycle`];
/// the trait's provided `activate()`/`deactivate()` call the transition
/// methods here so the machine is enforced uniformly across variants.
pub struct LifecycleCell {
    inner: Mutex<CellInner>,
    created_at: DateTime<Utc>,
}

impl LifecycleCell {
    /// New cell in CREATED.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(CellInner {
                state: LifecycleState::Created,
                activated_at: None,
            }),
            created_at: Utc::now(),
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.inner.lock().state
    }

    /// Construction timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Time since the component became ACTIVE, if it currently is.
    #[must_use]
    pub fn uptime(&self) -> Option<Duration> {
        let inner = self.inner.lock();
        match inner.state {
            LifecycleState::Active => inner.activated_at.map(|t| t.elapsed()),
            _ => None,
        }
    }

    /// Gate an `activate()` call.
    ///
    /// CREATED or STOPPED transitions to ACTIVATING. ACTIVE short-circuits
    /// as idempotent success. ACTIVATING/DEACTIVATING is a state conflict;
    /// FAILED requires `reset()` first.
    pub fn begin_activation(&self) -> Result<ActivationGate, ActivationError> {
        let mut inner = self.inner.lock();
        match inner.state {
            LifecycleState::Created | LifecycleState::Stopped => {
                inner.state = LifecycleState::Activating;
                Ok(ActivationGate::Proceed)
            }
            LifecycleState::Active => Ok(ActivationGate::AlreadyActive),
            LifecycleState::Failed => Err(ActivationError::ResetRequired),
            current @ (LifecycleState::Activating | LifecycleState::Deactivating) => {
                Err(ActivationError::StateConflict {
                    current,
                    attempted: "activate",
                })
            }
        }
    }

    /// ACTIVATING → ACTIVE after a successful startup hook.
    pub fn complete_activation(&self) {
        let mut inner = self.inner.lock();
        debug_assert_eq!(inner.state, LifecycleState::Activating);
        inner.state = LifecycleState::Active;
        inner.activated_at = Some(Instant::now());
    }

    /// Mark the component FAILED.
    ///
    /// Legal from ACTIVATING (startup hook error) and from ACTIVE
    /// (self-reported runtime failure). Other states are left untouched.
    pub fn fail(&self) {
        let mut inner = self.inner.lock();
        if matches!(
            inner.state,
            LifecycleState::Activating | LifecycleState::Active
        ) {
            inner.state = LifecycleState::Failed;
            inner.activated_at = None;
        }
    }

    /// Gate a `deactivate()` call.
    ///
    /// ACTIVE transitions to DEACTIVATING. STOPPED short-circuits as a
    /// no-op success. Everything else is a state conflict.
    pub fn begin_deactivation(&self) -> Result<DeactivationGate, ActivationError> {
        let mut inner = self.inner.lock();
        match inner.state {
            LifecycleState::Active => {
                inner.state = LifecycleState::Deactivating;
                Ok(DeactivationGate::Proceed)
            }
            LifecycleState::Stopped => Ok(DeactivationGate::AlreadyStopped),
            current => Err(ActivationError::StateConflict {
                current,
                attempted: "deactivate",
            }),
        }
    }

    /// DEACTIVATING → STOPPED once the cleanup hook returns.
    pub fn complete_deactivation(&self) {
        let mut inner = self.inner.lock();
        debug_assert_eq!(inner.state, LifecycleState::Deactivating);
        inner.state = LifecycleState::Stopped;
        inner.activated_at = None;
    }

    /// FAILED → CREATED, opening a fresh cycle.
    ///
    /// Reset of a non-FAILED component is a state conflict.
    pub fn reset(&self) -> Result<(), ActivationError> {
        let mut inner = self.inner.lock();
        match inner.state {
            LifecycleState::Failed => {
                inner.state = LifecycleState::Created;
                inner.activated_at = None;
                Ok(())
            }
            current => Err(ActivationError::StateConflict {
                current,
                attempted: "reset",
            }),
        }
    }
}

impl Default for LifecycleCell {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LifecycleCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleCell")
            .field("state", &self.state())
            .field("created_at", &self.created_at)
            .finish()
    }
}
