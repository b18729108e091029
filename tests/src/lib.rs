//! # Clarity Test Suite
//!
//! Unified test crate for cross-crate scenarios.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── lifecycle_flow.rs   # Contract semantics across activate/deactivate
//!     ├── manifest_queries.rs # Registry classification and queries
//!     ├── bus_delivery.rs     # Delivery, isolation, and ordering guarantees
//!     ├── loop_recording.rs   # Loop output envelope invariants
//!     └── boot_pipeline.rs    # Fail-fast pipeline, safe mode, announcements
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p clarity-tests
//!
//! # By area
//! cargo test -p clarity-tests integration::bus_delivery
//! ```

#![allow(unused_imports)]
#![allow(dead_code)]

pub mod integration;
