//! # Event Bus Delivery Scenarios
//!
//! The delivery guarantees components rely on:
//!
//! 1. **Present-subscribers-only**: a subscriber registered before
//!    `publish(E)` receives E exactly once; one registered after never
//!    receives that instance
//! 2. **Isolation**: a throwing handler cannot block other handlers of the
//!    same event
//! 3. **Per-subscriber ordering**: for one (publisher, subscriber) pair,
//!    delivery order equals publish order

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use parking_lot::Mutex;
    use tokio::time::timeout;

    use clarity_bus::{EventBus, EventHandler, FnHandler, HandlerError};
    use clarity_types::{ComponentId, Event};

    fn recording_handler(log: Arc<Mutex<Vec<u64>>>) -> Arc<dyn EventHandler> {
        Arc::new(FnHandler::new(move |event: Event| {
            let log = Arc::clone(&log);
            async move {
                let n = event.payload.get("n").and_then(|v| v.as_u64()).unwrap_or(0);
                log.lock().push(n);
                Ok::<(), HandlerError>(())
            }
        }))
    }

    async fn settle(log: &Arc<Mutex<Vec<u64>>>, len: usize) {
        timeout(Duration::from_secs(2), async {
            loop {
                if log.lock().len() >= len {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("delivery timed out");
    }

    #[tokio::test]
    async fn test_only_present_subscribers_receive_the_event() {
        let bus = EventBus::new();
        let source = ComponentId::new();

        let s1_log = Arc::new(Mutex::new(Vec::new()));
        let _s1 = bus.subscribe("loop.completed", "s1", recording_handler(Arc::clone(&s1_log)));

        bus.publish(Event::new("loop.completed", source).with_payload("n", 1u64))
            .await;

        let s2_log = Arc::new(Mutex::new(Vec::new()));
        let _s2 = bus.subscribe("loop.completed", "s2", recording_handler(Arc::clone(&s2_log)));

        settle(&s1_log, 1).await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        // S1 got the event exactly once; S2 never sees that instance.
        assert_eq!(*s1_log.lock(), vec![1]);
        assert!(s2_log.lock().is_empty());
    }

    #[tokio::test]
    async fn test_throwing_handler_does_not_starve_peers() {
        let bus = EventBus::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let _bad = bus.subscribe(
            "component.activated",
            "bad",
            Arc::new(FnHandler::new(|_event: Event| async {
                Err::<(), _>(HandlerError::failure("boom"))
            })),
        );
        let _worse = bus.subscribe(
            "component.activated",
            "worse",
            Arc::new(FnHandler::new(|_event: Event| async {
                panic!("boom");
                #[allow(unreachable_code)]
                Ok::<(), HandlerError>(())
            })),
        );
        let _good = bus.subscribe(
            "component.activated",
            "good",
            recording_handler(Arc::clone(&received)),
        );

        let accepted = bus
            .publish(Event::new("component.activated", ComponentId::new()).with_payload("n", 9u64))
            .await;
        assert_eq!(accepted, 3);

        settle(&received, 1).await;
        assert_eq!(*received.lock(), vec![9]);
    }

    #[tokio::test]
    async fn test_single_publisher_order_is_preserved_per_subscriber() {
        let bus = EventBus::new();
        let first = Arc::new(Mutex::new(Vec::new()));
        let second = Arc::new(Mutex::new(Vec::new()));
        let _a = bus.subscribe("loop.completed", "a", recording_handler(Arc::clone(&first)));
        let _b = bus.subscribe("loop.completed", "b", recording_handler(Arc::clone(&second)));

        let source = ComponentId::new();
        for n in 0..30u64 {
            bus.publish(Event::new("loop.completed", source).with_payload("n", n))
                .await;
        }

        settle(&first, 30).await;
        settle(&second, 30).await;
        let expected: Vec<u64> = (0..30).collect();
        assert_eq!(*first.lock(), expected);
        assert_eq!(*second.lock(), expected);
    }

    #[tokio::test]
    async fn test_publish_returns_before_handlers_finish() {
        let bus = EventBus::new();
        let (gate_tx, gate_rx) = tokio::sync::watch::channel(false);
        let done = Arc::new(Mutex::new(false));

        let done_inner = Arc::clone(&done);
        let _slow = bus.subscribe(
            "loop.completed",
            "slow",
            Arc::new(FnHandler::new(move |_event: Event| {
                let mut gate = gate_rx.clone();
                let done = Arc::clone(&done_inner);
                async move {
                    // Block until the publisher releases the gate.
                    while !*gate.borrow() {
                        if gate.changed().await.is_err() {
                            break;
                        }
                    }
                    *done.lock() = true;
                    Ok::<(), HandlerError>(())
                }
            })),
        );

        // publish() must return while the handler is still parked.
        let accepted = timeout(
            Duration::from_millis(500),
            bus.publish(Event::new("loop.completed", ComponentId::new())),
        )
        .await
        .expect("publish blocked on a running handler");
        assert_eq!(accepted, 1);
        assert!(!*done.lock());

        gate_tx.send(true).unwrap();
        timeout(Duration::from_secs(2), async {
            loop {
                if *done.lock() {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("handler never finished");
    }
}
