//! # Loop Output Envelope Scenarios
//!
//! The recorder's range checking and the envelope handed to external
//! consumers, including the bus emission path a processing routine uses to
//! report a pass.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use clarity_bus::{well_known, EventBus};
    use clarity_component::{LoopError, LoopOutput, LoopStatus};
    use clarity_types::ComponentId;

    fn results(items: u64) -> serde_json::Map<String, serde_json::Value> {
        let mut map = serde_json::Map::new();
        map.insert("items".to_string(), serde_json::Value::from(items));
        map
    }

    #[test]
    fn test_confidence_out_of_range_is_rejected() {
        let mut output = LoopOutput::create("digest", ComponentId::new());

        let err = output.mark_completed(results(10), 1.5).unwrap_err();
        assert!(matches!(err, LoopError::ConfidenceOutOfRange(_)));
        assert_eq!(output.status(), LoopStatus::Running);
    }

    #[test]
    fn test_envelope_reports_confidence_and_status() {
        let mut output = LoopOutput::create("digest", ComponentId::new());
        output.mark_completed(results(10), 0.92).unwrap();

        let envelope = output.to_envelope();
        assert_eq!(envelope.status, LoopStatus::Success);
        assert_eq!(envelope.confidence, Some(0.92));
        assert!(envelope.completed_at.unwrap() >= envelope.started_at);
    }

    #[tokio::test]
    async fn test_completed_loop_reaches_bus_observers() {
        let bus = EventBus::new();
        let mut observer = bus.subscribe_stream(well_known::LOOP_COMPLETED, "observer");

        let component_id = ComponentId::new();
        let mut output = LoopOutput::create("digest", component_id);
        output.mark_completed(results(3), 0.75).unwrap();
        bus.publish(output.to_envelope().into_event()).await;

        let event = timeout(Duration::from_secs(1), observer.recv())
            .await
            .expect("timeout")
            .expect("event");
        assert_eq!(event.source, component_id);
        assert_eq!(event.payload["loop_type"], "digest");
        assert_eq!(event.payload["confidence"], 0.75);
        assert_eq!(event.payload["results"]["items"], 3);
    }

    #[test]
    fn test_failed_loop_freezes_without_confidence() {
        let mut output = LoopOutput::create("digest", ComponentId::new());
        output.mark_failed("source unreachable").unwrap();

        assert!(output.mark_completed(results(1), 0.5).is_err());
        let envelope = output.to_envelope();
        assert_eq!(envelope.status, LoopStatus::Failed);
        assert!(envelope.confidence.is_none());
        assert_eq!(envelope.error.as_deref(), Some("source unreachable"));
    }
}
