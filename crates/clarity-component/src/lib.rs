//! # Clarity Component - Lifecycle Contract
//!
//! The standardized contract every component variant implements: how it
//! starts, stops, reports health, and records the outcome of discrete
//! processing passes.
//!
//! ## Lifecycle State Machine
//!
//! ```text
//!                 activate()                    deactivate()
//!  ┌─────────┐   ┌────────────┐   ┌────────┐   ┌──────────────┐   ┌─────────┐
//!  │ CREATED │──▶│ ACTIVATING │──▶│ ACTIVE │──▶│ DEACTIVATING │──▶│ STOPPED │
//!  └─────────┘   └─────┬──────┘   └───┬────┘   └──────────────┘   └────┬────┘
//!       ▲              │              │                                │
//!       │              ▼              ▼                                │
//!       │         ┌─────────────────────┐         activate()          │
//!       └─reset()─┤       FAILED        │      ◀──────────────────────┘
//!                 └─────────────────────┘
//! ```
//!
//! Components implement the [`Component`] trait's `on_activate` /
//! `on_deactivate` hooks; the provided `activate()` / `deactivate()`
//! methods run the state machine around them so every component variant
//! gets identical transition semantics — idempotent re-activation,
//! state-conflict rejection, and faithful failure propagation.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod error;
pub mod lifecycle;
pub mod loop_output;
pub mod testing;
pub mod traits;

// Re-export main types
pub use error::ActivationError;
pub use lifecycle::{ActivationGate, DeactivationGate, LifecycleCell, LifecycleState};
pub use loop_output::{LoopEnvelope, LoopError, LoopOutput, LoopStatus};
pub use traits::{Component, StatusSnapshot};
