//! # Clarity Manifest - Component Registry
//!
//! The authoritative store of component instances. Each registered
//! component gets one [`ManifestEntry`] keyed by its id, carrying the
//! trust classification assigned at registration, a validated set of role
//! tags, the active flag, and the last heartbeat timestamp.
//!
//! ## Concurrency
//!
//! One `parking_lot::RwLock` guards the entry map. Mutations (register,
//! status updates, heartbeats, trust escalation) take the write lock — a
//! single exclusive section per mutation. Queries take the read lock and
//! observe a consistent snapshot; a partially-written entry is never
//! visible because entries are fully constructed before insertion.
//!
//! ## Trust
//!
//! Trust is fixed at registration. [`Manifest::escalate_trust`] is the one
//! privileged path that raises it; lowering or equal re-assignment is
//! rejected. Trust queries are exact-match by documented design choice —
//! the threshold form is the separate
//! [`Manifest::get_components_by_trust_at_least`].

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod entry;
pub mod manifest;

// Re-export main types
pub use entry::{EntrySummary, ManifestEntry};
pub use manifest::Manifest;
