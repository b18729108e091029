//! Subscription handles and queues.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio_stream::Stream;
use tracing::{debug, warn};
use uuid::Uuid;

use clarity_types::Event;

use crate::bus::BusCore;

/// Bounded per-subscription event queue with drop-oldest overflow.
pub(crate) struct SubQueue {
    subscriber: String,
    capacity: usize,
    deque: Mutex<VecDeque<Event>>,
    notify: Notify,
    dropped: AtomicU64,
    closed: AtomicBool,
}

impl SubQueue {
    pub(crate) fn new(subscriber: String, capacity: usize) -> Self {
        Self {
            subscriber,
            capacity,
            deque: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
            dropped: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        }
    }

    /// Enqueue one event, evicting the oldest on overflow.
    ///
    /// Returns `false` if the subscription is already closed.
    pub(crate) fn push(&self, event: Event) -> bool {
        if self.closed.load(Ordering::Acquire) {
            return false;
        }

        {
            let mut deque = self.deque.lock();
            if deque.len() >= self.capacity {
                deque.pop_front();
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(
                    subscriber = %self.subscriber,
                    dropped_total = dropped,
                    "subscription queue full, oldest event dropped"
                );
            }
            deque.push_back(event);
        }

        self.notify.notify_one();
        true
    }

    pub(crate) fn try_pop(&self) -> Option<Event> {
        self.deque.lock().pop_front()
    }

    /// Wait for the next event; `None` once closed and drained.
    pub(crate) async fn recv(&self) -> Option<Event> {
        loop {
            let notified = self.notify.notified();
            if let Some(event) = self.try_pop() {
                return Some(event);
            }
            if self.closed.load(Ordering::Acquire) {
                return None;
            }
            notified.await;
        }
    }

    pub(crate) fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.deque.lock().clear();
        // notify_one stores a permit, so a waiter registering late still wakes.
        self.notify.notify_one();
        self.notify.notify_waiters();
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub(crate) fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub(crate) fn subscriber(&self) -> &str {
        &self.subscriber
    }
}

/// Where a subscription is slotted in the bus tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SlotKey {
    /// Exact event-type match.
    Exact(String),
    /// Opt-in prefix match.
    Prefix(String),
}

/// Handle for one subscription.
///
/// Dropping the handle (or calling [`SubscriptionHandle::unsubscribe`])
/// removes the subscription from the bus and stops delivery; events already
/// queued are discarded.
pub struct SubscriptionHandle {
    pub(crate) core: Arc<BusCore>,
    pub(crate) key: SlotKey,
    pub(crate) sub_id: Uuid,
    pub(crate) queue: Arc<SubQueue>,
}

impl SubscriptionHandle {
    /// Subscription id.
    #[must_use]
    pub fn sub_id(&self) -> Uuid {
        self.sub_id
    }

    /// Subscriber label this subscription was created with.
    #[must_use]
    pub fn subscriber(&self) -> &str {
        self.queue.subscriber()
    }

    /// Events discarded by the drop-oldest overflow policy so far.
    #[must_use]
    pub fn dropped_events(&self) -> u64 {
        self.queue.dropped()
    }

    /// Explicitly remove the subscription.
    pub fn unsubscribe(self) {
        // Drop does the work.
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.core.remove(&self.key, self.sub_id);
        self.queue.close();
        debug!(subscriber = %self.queue.subscriber(), "subscription dropped");
    }
}

/// Pull-based subscription for observers that prefer a stream over a
/// callback.
///
/// Shares the bounded drop-oldest queue semantics of handler
/// subscriptions. Dropping the stream unsubscribes.
pub struct EventStream {
    pub(crate) queue: Arc<SubQueue>,
    pub(crate) _handle: SubscriptionHandle,
}

impl EventStream {
    /// Receive the next event; `None` once the subscription is closed.
    pub async fn recv(&mut self) -> Option<Event> {
        self.queue.recv().await
    }

    /// Events discarded by the overflow policy so far.
    #[must_use]
    pub fn dropped_events(&self) -> u64 {
        self.queue.dropped()
    }
}

impl Stream for EventStream {
    type Item = Event;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.queue.try_pop() {
            Some(event) => Poll::Ready(Some(event)),
            None => {
                if self.queue.is_closed() {
                    Poll::Ready(None)
                } else {
                    // No waker registration on the queue; re-poll.
                    cx.waker().wake_by_ref();
                    Poll::Pending
                }
            }
        }
    }
}
