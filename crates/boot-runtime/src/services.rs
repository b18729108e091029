//! Built-in framework services and bring-up blueprints.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use tokio::sync::watch;
use tracing::{debug, warn};

use clarity_bus::{EventBus, FnHandler, SubscriptionHandle};
use clarity_component::{ActivationError, Component, LifecycleCell};
use clarity_manifest::Manifest;
use clarity_types::{well_known, ComponentId, Event, RoleTag, TrustLevel};

/// One service the orchestrator brings up at stage 5: the component plus
/// its registration classification.
pub struct ServiceBlueprint {
    /// The component to register and activate.
    pub component: Arc<dyn Component>,
    /// Trust assigned at registration.
    pub trust_level: TrustLevel,
    /// Validated role tags.
    pub role_tags: Vec<RoleTag>,
}

impl ServiceBlueprint {
    /// Build a blueprint.
    #[must_use]
    pub fn new(
        component: Arc<dyn Component>,
        trust_level: TrustLevel,
        role_tags: &[RoleTag],
    ) -> Self {
        Self {
            component,
            trust_level,
            role_tags: role_tags.to_vec(),
        }
    }
}

/// Periodic heartbeat refresher.
///
/// While active, refreshes the manifest heartbeat of every active
/// component on a fixed interval. Heartbeats go straight to the manifest —
/// they are never routed through the event bus, so bus latency cannot
/// starve liveness.
pub struct PulseService {
    id: ComponentId,
    cell: LifecycleCell,
    manifest: Arc<Manifest>,
    interval: Duration,
    beats: Arc<AtomicU64>,
    stop: Mutex<Option<watch::Sender<bool>>>,
}

impl PulseService {
    /// Build a pulse service beating at `interval`.
    #[must_use]
    pub fn new(manifest: Arc<Manifest>, interval: Duration) -> Self {
        Self {
            id: ComponentId::new(),
            cell: LifecycleCell::new(),
            manifest,
            interval,
            beats: Arc::new(AtomicU64::new(0)),
            stop: Mutex::new(None),
        }
    }

    /// Completed heartbeat sweeps.
    #[must_use]
    pub fn beats(&self) -> u64 {
        self.beats.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Component for PulseService {
    fn id(&self) -> ComponentId {
        self.id
    }

    fn type_tag(&self) -> &str {
        "pulse"
    }

    fn lifecycle(&self) -> &LifecycleCell {
        &self.cell
    }

    fn health_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("beats".to_string(), Value::from(self.beats()));
        fields.insert(
            "interval_secs".to_string(),
            Value::from(self.interval.as_secs()),
        );
        fields
    }

    async fn on_activate(&self) -> Result<(), ActivationError> {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let manifest = Arc::clone(&self.manifest);
        let beats = Arc::clone(&self.beats);
        let interval = self.interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // First tick fires immediately; skip it so beats count sweeps.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        for summary in manifest.snapshot() {
                            if summary.active {
                                // A component may deregister between
                                // snapshot and refresh; ignore the miss.
                                let _ = manifest.heartbeat(summary.id);
                            }
                        }
                        beats.fetch_add(1, Ordering::Relaxed);
                    }
                    _ = stop_rx.changed() => {
                        debug!("pulse loop stopped");
                        break;
                    }
                }
            }
        });

        *self.stop.lock() = Some(stop_tx);
        Ok(())
    }

    async fn on_deactivate(&self) -> Result<(), ActivationError> {
        if let Some(stop) = self.stop.lock().take() {
            let _ = stop.send(true);
        }
        Ok(())
    }
}

/// Failure observer installed at the oversight stage.
///
/// Subscribes to `component.failed` and keeps a running count for its
/// health snapshot; external alerting layers subscribe to the same events
/// themselves.
pub struct OversightService {
    id: ComponentId,
    cell: LifecycleCell,
    bus: EventBus,
    failures: Arc<AtomicU64>,
    subscription: Mutex<Option<SubscriptionHandle>>,
}

impl OversightService {
    /// Build an oversight service watching `bus`.
    #[must_use]
    pub fn new(bus: EventBus) -> Self {
        Self {
            id: ComponentId::new(),
            cell: LifecycleCell::new(),
            bus,
            failures: Arc::new(AtomicU64::new(0)),
            subscription: Mutex::new(None),
        }
    }

    /// Component failures observed since activation.
    #[must_use]
    pub fn failures_observed(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Component for OversightService {
    fn id(&self) -> ComponentId {
        self.id
    }

    fn type_tag(&self) -> &str {
        "oversight"
    }

    fn lifecycle(&self) -> &LifecycleCell {
        &self.cell
    }

    fn health_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert(
            "failures_observed".to_string(),
            Value::from(self.failures_observed()),
        );
        fields
    }

    async fn on_activate(&self) -> Result<(), ActivationError> {
        let failures = Arc::clone(&self.failures);
        let handle = self.bus.subscribe(
            well_known::COMPONENT_FAILED,
            "oversight",
            Arc::new(FnHandler::new(move |event: Event| {
                let failures = Arc::clone(&failures);
                async move {
                    failures.fetch_add(1, Ordering::Relaxed);
                    warn!(source = %event.source, "component failure observed");
                    Ok::<(), clarity_bus::HandlerError>(())
                }
            })),
        );
        *self.subscription.lock() = Some(handle);
        Ok(())
    }

    async fn on_deactivate(&self) -> Result<(), ActivationError> {
        // Dropping the handle unsubscribes.
        self.subscription.lock().take();
        Ok(())
    }
}
