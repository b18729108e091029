//! # Boot Runtime
//!
//! Boot-time composition of the Clarity framework: a strictly sequential,
//! fail-fast pipeline of named stages that validates the environment,
//! checks secrets, brings up services, smoke-tests them, and records
//! forensic diagnostics.
//!
//! ## Pipeline
//!
//! ```text
//!  0 environment check        ┐
//!  1 dependency check         │
//!  2 schema & secret check    ├── safe-mode scope (stages 0-4)
//!  3 safe-mode playbooks      │
//!  4 metrics & playbooks      ┘
//!  5 main service bring-up    ┐
//!  6 smoke tests              ├── full scope only
//!  7 oversight setup          │
//!  8 forensic diagnostics     ┘
//! ```
//!
//! A stage failure halts the pipeline immediately; later stages are never
//! attempted. The resulting [`BootReport`] lists every attempted stage and
//! maps to a process exit code: `0` success, `1..=8` the first failing
//! stage, [`CRITICAL_EXIT_CODE`] for errors outside the stage contract.
//!
//! ## Composition
//!
//! A single [`RuntimeContext`] (event bus + manifest) is constructed once
//! per process and handed to every stage and service — there are no global
//! singletons. During bring-up each supplied [`ServiceBlueprint`] is
//! registered in the manifest with its trust level and role tags, then
//! activated through the lifecycle contract; activations and stage
//! outcomes are announced on the event bus for external observers.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod context;
pub mod error;
pub mod orchestrator;
pub mod ports;
pub mod services;
pub mod stage;

// Re-export main types
pub use config::{BootConfig, Playbook};
pub use context::RuntimeContext;
pub use error::{StageError, StageErrorKind};
pub use orchestrator::BootOrchestrator;
pub use ports::{
    EnvSecretsSource, LoggingReportSink, LoggingSnapshotStore, NullSnapshotStore, ReportSink,
    SecretsSource, SnapshotStore, StaticSecrets,
};
pub use services::{OversightService, PulseService, ServiceBlueprint};
pub use stage::{BootReport, BootScope, BootStage, OverallStatus, StageResult, StageStatus};

/// Exit code for failures outside the documented stage contract.
pub const CRITICAL_EXIT_CODE: i32 = 99;
