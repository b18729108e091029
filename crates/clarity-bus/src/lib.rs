//! # Clarity Bus - Event Bus for Inter-Component Communication
//!
//! Components never hold references to each other; they exchange typed
//! events through this bus.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │ Component A  │                    │ Component B  │
//! │              │    publish()       │              │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │ ─────────┘
//!                  │              │  subscribe()
//!                  └──────────────┘
//! ```
//!
//! ## Delivery Contract
//!
//! - Exact-match subscriptions by event type; prefix matching is the
//!   explicit opt-in [`EventBus::subscribe_prefix`], never the default.
//! - `publish()` returns once the event is enqueued for every current
//!   subscriber — it never waits for handlers to run. Subscribers added
//!   after a publish never see that event instance.
//! - Per-(publisher, subscriber) ordering: one drain task per subscription
//!   delivers its queue strictly in order. No ordering holds across
//!   different publishers or different subscribers.
//! - Backpressure: each subscription has a bounded queue. On overflow the
//!   bus **drops the oldest** undelivered event, logs it, and counts it on
//!   the subscription — the publisher is never blocked by a slow
//!   subscriber.
//! - Isolation: a handler error or panic is caught at the bus boundary and
//!   logged; other handlers of the same event and the publisher are
//!   unaffected.
//!
//! Total handler concurrency is capped by a worker-pool semaphore shared
//! by all subscriptions.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod bus;
pub mod handler;
pub mod subscription;

// Re-export main types
pub use bus::{BusConfig, EventBus};
pub use clarity_types::{well_known, Event};
pub use handler::{EventHandler, FnHandler, HandlerError};
pub use subscription::{EventStream, SubscriptionHandle};

/// Default maximum events buffered per subscription before drop-oldest.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Default cap on concurrently running handler invocations.
pub const DEFAULT_WORKER_PERMITS: usize = 8;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_queue_capacity() {
        assert_eq!(DEFAULT_QUEUE_CAPACITY, 256);
    }

    #[test]
    fn test_default_config() {
        let config = BusConfig::default();
        assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert_eq!(config.worker_permits, DEFAULT_WORKER_PERMITS);
    }
}
