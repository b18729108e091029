//! # Clarity Types
//!
//! Shared type definitions for the Clarity component runtime.
//!
//! Every framework crate speaks in terms of these types:
//!
//! - [`ComponentId`] — process-unique component identity
//! - [`TrustLevel`] — ordinal trust classification of a component
//! - [`RoleTag`] — validated vocabulary of component roles
//! - [`Event`] — the envelope carried by the event bus
//! - [`ConfigError`] — rejection of invalid registration/configuration input
//!
//! Trust and role values arriving from the outside world (environment,
//! config files, API callers) cross the string boundary through `FromStr`,
//! which rejects anything outside the vocabulary. Inside the process the
//! enums make invalid values unrepresentable.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod error;
pub mod event;
pub mod id;
pub mod role;
pub mod trust;

// Re-export main types
pub use error::ConfigError;
pub use event::{well_known, Event};
pub use id::ComponentId;
pub use role::RoleTag;
pub use trust::TrustLevel;
