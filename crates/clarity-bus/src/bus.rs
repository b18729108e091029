//! The event bus.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Semaphore;
use tracing::{debug, error, warn};
use uuid::Uuid;

use clarity_types::Event;

use crate::handler::EventHandler;
use crate::subscription::{EventStream, SlotKey, SubQueue, SubscriptionHandle};
use crate::{DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKER_PERMITS};

/// Bus tuning knobs.
#[derive(Debug, Clone)]
pub struct BusConfig {
    /// Maximum events buffered per subscription before drop-oldest.
    pub queue_capacity: usize,
    /// Cap on concurrently running handler invocations across the bus.
    pub worker_permits: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            worker_permits: DEFAULT_WORKER_PERMITS,
        }
    }
}

struct SubEntry {
    sub_id: Uuid,
    queue: Arc<SubQueue>,
}

/// Shared bus state; subscription handles hold an `Arc` to unregister.
pub(crate) struct BusCore {
    exact: RwLock<HashMap<String, Vec<SubEntry>>>,
    prefix: RwLock<Vec<(String, SubEntry)>>,
    workers: Arc<Semaphore>,
    published: AtomicU64,
    config: BusConfig,
}

impl BusCore {
    pub(crate) fn remove(&self, key: &SlotKey, sub_id: Uuid) {
        match key {
            SlotKey::Exact(event_type) => {
                let mut exact = self.exact.write();
                if let Some(entries) = exact.get_mut(event_type) {
                    entries.retain(|entry| entry.sub_id != sub_id);
                    if entries.is_empty() {
                        exact.remove(event_type);
                    }
                }
            }
            SlotKey::Prefix(_) => {
                self.prefix
                    .write()
                    .retain(|(_, entry)| entry.sub_id != sub_id);
            }
        }
    }
}

/// In-process event bus.
///
/// Cheap to clone; clones share the same subscriber table and worker pool.
/// See the crate docs for the delivery contract.
#[derive(Clone)]
pub struct EventBus {
    core: Arc<BusCore>,
}

impl EventBus {
    /// Create a bus with default tuning.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(BusConfig::default())
    }

    /// Create a bus with explicit tuning.
    #[must_use]
    pub fn with_config(config: BusConfig) -> Self {
        Self {
            core: Arc::new(BusCore {
                exact: RwLock::new(HashMap::new()),
                prefix: RwLock::new(Vec::new()),
                workers: Arc::new(Semaphore::new(config.worker_permits.max(1))),
                published: AtomicU64::new(0),
                config,
            }),
        }
    }

    /// Subscribe a handler to an exact event type.
    ///
    /// The returned handle unsubscribes on drop. The `subscriber` label
    /// identifies the subscription in logs and diagnostics.
    #[must_use]
    pub fn subscribe(
        &self,
        event_type: impl Into<String>,
        subscriber: impl Into<String>,
        handler: Arc<dyn EventHandler>,
    ) -> SubscriptionHandle {
        let event_type = event_type.into();
        let (queue, sub_id) = self.install(
            SlotKey::Exact(event_type.clone()),
            subscriber.into(),
        );
        self.spawn_drain(Arc::clone(&queue), handler);
        debug!(event_type = %event_type, subscriber = %queue.subscriber(), "subscription created");

        SubscriptionHandle {
            core: Arc::clone(&self.core),
            key: SlotKey::Exact(event_type),
            sub_id,
            queue,
        }
    }

    /// Opt-in prefix subscription: delivers every event whose type starts
    /// with `prefix`.
    ///
    /// Deliberately a separate call so default subscriptions never fan out
    /// beyond their exact type.
    #[must_use]
    pub fn subscribe_prefix(
        &self,
        prefix: impl Into<String>,
        subscriber: impl Into<String>,
        handler: Arc<dyn EventHandler>,
    ) -> SubscriptionHandle {
        let prefix = prefix.into();
        let (queue, sub_id) = self.install(SlotKey::Prefix(prefix.clone()), subscriber.into());
        self.spawn_drain(Arc::clone(&queue), handler);
        debug!(prefix = %prefix, subscriber = %queue.subscriber(), "prefix subscription created");

        SubscriptionHandle {
            core: Arc::clone(&self.core),
            key: SlotKey::Prefix(prefix),
            sub_id,
            queue,
        }
    }

    /// Pull-based subscription to an exact event type.
    #[must_use]
    pub fn subscribe_stream(
        &self,
        event_type: impl Into<String>,
        subscriber: impl Into<String>,
    ) -> EventStream {
        let event_type = event_type.into();
        let (queue, sub_id) = self.install(
            SlotKey::Exact(event_type.clone()),
            subscriber.into(),
        );

        EventStream {
            queue: Arc::clone(&queue),
            _handle: SubscriptionHandle {
                core: Arc::clone(&self.core),
                key: SlotKey::Exact(event_type),
                sub_id,
                queue,
            },
        }
    }

    /// Publish an event to every currently matching subscription.
    ///
    /// Returns the number of subscription queues the event was accepted
    /// into. Later subscribers never see this event instance.
    pub async fn publish(&self, event: Event) -> usize {
        self.core.published.fetch_add(1, Ordering::Relaxed);

        let mut accepted = 0;
        {
            let exact = self.core.exact.read();
            if let Some(entries) = exact.get(&event.event_type) {
                for entry in entries {
                    if entry.queue.push(event.clone()) {
                        accepted += 1;
                    }
                }
            }
        }
        {
            let prefix = self.core.prefix.read();
            for (pattern, entry) in prefix.iter() {
                if event.event_type.starts_with(pattern.as_str())
                    && entry.queue.push(event.clone())
                {
                    accepted += 1;
                }
            }
        }

        if accepted == 0 {
            warn!(event_type = %event.event_type, "event dropped (no subscribers)");
        } else {
            debug!(
                event_type = %event.event_type,
                source = %event.source,
                receivers = accepted,
                "event published"
            );
        }
        accepted
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        let exact: usize = self.core.exact.read().values().map(Vec::len).sum();
        exact + self.core.prefix.read().len()
    }

    /// Total events published on this bus.
    #[must_use]
    pub fn events_published(&self) -> u64 {
        self.core.published.load(Ordering::Relaxed)
    }

    /// The configured per-subscription queue capacity.
    #[must_use]
    pub fn queue_capacity(&self) -> usize {
        self.core.config.queue_capacity
    }

    fn install(&self, key: SlotKey, subscriber: String) -> (Arc<SubQueue>, Uuid) {
        let queue = Arc::new(SubQueue::new(subscriber, self.core.config.queue_capacity));
        let sub_id = Uuid::new_v4();
        let entry = SubEntry {
            sub_id,
            queue: Arc::clone(&queue),
        };

        match key {
            SlotKey::Exact(event_type) => {
                self.core
                    .exact
                    .write()
                    .entry(event_type)
                    .or_default()
                    .push(entry);
            }
            SlotKey::Prefix(prefix) => {
                self.core.prefix.write().push((prefix, entry));
            }
        }
        (queue, sub_id)
    }

    /// One drain task per subscription keeps per-subscriber delivery in
    /// publish order; each invocation runs on its own task so a panic is
    /// contained, gated by the shared worker pool.
    fn spawn_drain(&self, queue: Arc<SubQueue>, handler: Arc<dyn EventHandler>) {
        let workers = Arc::clone(&self.core.workers);
        tokio::spawn(async move {
            while let Some(event) = queue.recv().await {
                let Ok(permit) = Arc::clone(&workers).acquire_owned().await else {
                    break;
                };
                let handler = Arc::clone(&handler);
                let event_type = event.event_type.clone();
                let invocation = tokio::spawn(async move {
                    let _permit = permit;
                    handler.handle(event).await
                });

                match invocation.await {
                    Ok(Ok(())) => {}
                    Ok(Err(err)) => {
                        warn!(
                            subscriber = %queue.subscriber(),
                            event_type = %event_type,
                            error = %err,
                            "handler failed; dispatch continues"
                        );
                    }
                    Err(join_err) if join_err.is_panic() => {
                        error!(
                            subscriber = %queue.subscriber(),
                            event_type = %event_type,
                            "handler panicked; isolated at bus boundary"
                        );
                    }
                    Err(_) => {}
                }
            }
        });
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
