//! The boot orchestrator.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::timeout;
use tracing::{error, info, warn};

use clarity_component::{Component, LoopOutput};
use clarity_types::{well_known, ComponentId, ConfigError, Event, RoleTag, TrustLevel};

use crate::config::BootConfig;
use crate::context::RuntimeContext;
use crate::error::{StageError, StageErrorKind};
use crate::ports::{SecretsSource, SnapshotStore};
use crate::services::{OversightService, PulseService, ServiceBlueprint};
use crate::stage::{BootReport, BootScope, BootStage, OverallStatus, StageResult, StageStatus};

/// Deployment environments the environment check accepts.
const KNOWN_ENVIRONMENTS: [&str; 3] = ["development", "staging", "production"];

/// Signing secrets must decode to exactly this many bytes.
const SIGNING_SECRET_LEN: usize = 32;

/// Sequences the boot pipeline over one [`RuntimeContext`].
///
/// Stages run strictly one at a time; a stage never starts before the
/// previous stage's result is known, and the first failure halts the
/// pipeline. An abort requested via [`BootOrchestrator::abort`] takes
/// effect at the next stage boundary — the in-flight stage runs to
/// completion or its own timeout budget.
pub struct BootOrchestrator {
    ctx: RuntimeContext,
    config: BootConfig,
    blueprints: Vec<ServiceBlueprint>,
    secrets: Arc<dyn SecretsSource>,
    snapshots: Arc<dyn SnapshotStore>,
    abort_tx: watch::Sender<bool>,
    abort_rx: watch::Receiver<bool>,
    brought_up: Mutex<Vec<Arc<dyn Component>>>,
    /// Source id for events this orchestrator publishes.
    orchestrator_id: ComponentId,
}

impl BootOrchestrator {
    /// Create an orchestrator over the given context and collaborators.
    #[must_use]
    pub fn new(
        ctx: RuntimeContext,
        config: BootConfig,
        secrets: Arc<dyn SecretsSource>,
        snapshots: Arc<dyn SnapshotStore>,
    ) -> Self {
        let (abort_tx, abort_rx) = watch::channel(false);
        Self {
            ctx,
            config,
            blueprints: Vec::new(),
            secrets,
            snapshots,
            abort_tx,
            abort_rx,
            brought_up: Mutex::new(Vec::new()),
            orchestrator_id: ComponentId::new(),
        }
    }

    /// Add a service to bring up at stage 5.
    #[must_use]
    pub fn with_service(mut self, blueprint: ServiceBlueprint) -> Self {
        self.blueprints.push(blueprint);
        self
    }

    /// Add the built-in framework services (currently the pulse service).
    #[must_use]
    pub fn with_default_services(self) -> Self {
        let pulse = PulseService::new(
            Arc::clone(self.ctx.manifest()),
            Duration::from_secs(self.config.heartbeat_interval_secs),
        );
        let blueprint = ServiceBlueprint::new(
            Arc::new(pulse),
            TrustLevel::High,
            &[RoleTag::Scheduling],
        );
        self.with_service(blueprint)
    }

    /// The runtime context this orchestrator composes.
    #[must_use]
    pub fn context(&self) -> &RuntimeContext {
        &self.ctx
    }

    /// Request an abort; takes effect at the next stage boundary.
    pub fn abort(&self) {
        let _ = self.abort_tx.send(true);
    }

    /// Run the pipeline over the given scope and return the report.
    pub async fn boot(&self, scope: BootScope) -> BootReport {
        let started_at = Utc::now();
        info!("===========================================");
        info!("  Clarity Boot Runtime v0.1.0");
        info!("  scope: {scope:?}, environment: {}", self.config.environment);
        info!("===========================================");

        self.snapshots.pre_boot();

        let mut results = Vec::new();
        for &stage in scope.stages() {
            if *self.abort_rx.borrow() {
                warn!(stage = %stage, "abort observed at stage boundary, halting");
                let result = StageResult {
                    stage,
                    index: stage.index(),
                    status: StageStatus::Failed,
                    duration_ms: 0,
                    error: Some(StageError::new(stage, StageErrorKind::Aborted).to_string()),
                };
                self.announce_stage(&result).await;
                results.push(result);
                break;
            }

            info!(stage = %stage, index = stage.index(), "stage starting");
            let start = Instant::now();
            let budget = Duration::from_secs(self.config.stage_timeout_secs);
            let outcome = match timeout(budget, self.run_stage(stage)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(StageError::new(
                    stage,
                    StageErrorKind::Timeout(self.config.stage_timeout_secs),
                )),
            };
            let duration_ms = start.elapsed().as_millis() as u64;

            let result = match outcome {
                Ok(()) => {
                    info!(stage = %stage, duration_ms, "stage completed");
                    StageResult {
                        stage,
                        index: stage.index(),
                        status: StageStatus::Passed,
                        duration_ms,
                        error: None,
                    }
                }
                Err(err) => {
                    error!(stage = %stage, duration_ms, error = %err, "stage failed, halting pipeline");
                    StageResult {
                        stage,
                        index: stage.index(),
                        status: StageStatus::Failed,
                        duration_ms,
                        error: Some(err.to_string()),
                    }
                }
            };

            self.snapshots.post_stage(stage, &result);
            self.announce_stage(&result).await;

            let failed = result.status == StageStatus::Failed;
            results.push(result);
            if failed {
                break;
            }
        }

        let overall = if results
            .iter()
            .any(|result| result.status == StageStatus::Failed)
        {
            OverallStatus::Failed
        } else {
            OverallStatus::Success
        };

        BootReport {
            scope,
            overall,
            results,
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Deactivate brought-up services in reverse bring-up order.
    pub async fn shutdown(&self) {
        info!("shutting down brought-up services");
        let services: Vec<Arc<dyn Component>> = {
            let mut brought_up = self.brought_up.lock();
            brought_up.drain(..).rev().collect()
        };

        for component in services {
            let id = component.id();
            match component.deactivate().await {
                Ok(()) => {
                    let _ = self.ctx.manifest().update_status(id, false);
                    self.ctx
                        .bus()
                        .publish(Event::new(well_known::COMPONENT_DEACTIVATED, id))
                        .await;
                }
                Err(err) => {
                    warn!(id = %id, error = %err, "service deactivation failed");
                }
            }
        }
    }

    async fn run_stage(&self, stage: BootStage) -> Result<(), StageError> {
        match stage {
            BootStage::EnvironmentCheck => self.stage_environment(),
            BootStage::DependencyCheck => self.stage_dependencies(),
            BootStage::SchemaSecretValidation => self.stage_schema_secrets(),
            BootStage::SafeModePlaybooks => self.stage_safe_mode_playbooks(),
            BootStage::MetricsPlaybookValidation => self.stage_metrics_playbooks(),
            BootStage::ServiceBringUp => self.stage_bring_up().await,
            BootStage::SmokeTests => self.stage_smoke_tests().await,
            BootStage::OversightSetup => self.stage_oversight().await,
            BootStage::ForensicDiagnostics => self.stage_forensics().await,
        }
    }

    /// Stage 0: the process environment is sane.
    fn stage_environment(&self) -> Result<(), StageError> {
        let stage = BootStage::EnvironmentCheck;

        if !KNOWN_ENVIRONMENTS.contains(&self.config.environment.as_str()) {
            return Err(StageError::new(
                stage,
                ConfigError::InvalidValue {
                    name: "environment",
                    reason: format!(
                        "{:?} is not one of {KNOWN_ENVIRONMENTS:?}",
                        self.config.environment
                    ),
                },
            ));
        }

        let cwd = std::env::current_dir()
            .map_err(|err| StageError::new(stage, StageErrorKind::Internal(err.to_string())))?;
        info!(environment = %self.config.environment, cwd = %cwd.display(), "environment ok");
        Ok(())
    }

    /// Stage 1: runtime dependency limits are workable.
    fn stage_dependencies(&self) -> Result<(), StageError> {
        let stage = BootStage::DependencyCheck;

        if self.config.queue_capacity == 0 {
            return Err(StageError::new(
                stage,
                ConfigError::InvalidValue {
                    name: "queue_capacity",
                    reason: "must be at least 1".to_string(),
                },
            ));
        }
        if self.config.worker_permits == 0 {
            return Err(StageError::new(
                stage,
                ConfigError::InvalidValue {
                    name: "worker_permits",
                    reason: "must be at least 1".to_string(),
                },
            ));
        }
        if self.config.heartbeat_interval_secs == 0 {
            return Err(StageError::new(
                stage,
                ConfigError::InvalidValue {
                    name: "heartbeat_interval_secs",
                    reason: "must be at least 1".to_string(),
                },
            ));
        }

        info!(
            cpus = num_cpus::get(),
            worker_permits = self.config.worker_permits,
            queue_capacity = self.config.queue_capacity,
            "dependencies ok"
        );
        Ok(())
    }

    /// Stage 2: required secrets exist and have the right shape.
    fn stage_schema_secrets(&self) -> Result<(), StageError> {
        let stage = BootStage::SchemaSecretValidation;

        let signing_secret = self
            .secrets
            .signing_secret()
            .map_err(|err| StageError::new(stage, err))?;
        let decoded = hex::decode(&signing_secret).map_err(|err| {
            StageError::new(
                stage,
                ConfigError::InvalidSecret {
                    name: "CLARITY_SIGNING_SECRET",
                    reason: format!("not valid hex: {err}"),
                },
            )
        })?;
        if decoded.len() != SIGNING_SECRET_LEN {
            return Err(StageError::new(
                stage,
                ConfigError::InvalidSecret {
                    name: "CLARITY_SIGNING_SECRET",
                    reason: format!("expected {SIGNING_SECRET_LEN} bytes, got {}", decoded.len()),
                },
            ));
        }

        let database_url = self
            .secrets
            .database_url()
            .map_err(|err| StageError::new(stage, err))?;
        if !database_url.contains("://") {
            return Err(StageError::new(
                stage,
                ConfigError::InvalidSecret {
                    name: "CLARITY_DATABASE_URL",
                    reason: "missing scheme".to_string(),
                },
            ));
        }

        info!("schema and secrets ok");
        Ok(())
    }

    /// Stage 3: safe-mode playbooks are defined and well-formed.
    fn stage_safe_mode_playbooks(&self) -> Result<(), StageError> {
        let stage = BootStage::SafeModePlaybooks;

        if self.config.playbooks.is_empty() {
            return Err(StageError::new(
                stage,
                ConfigError::InvalidValue {
                    name: "playbooks",
                    reason: "at least one safe-mode playbook is required".to_string(),
                },
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for playbook in &self.config.playbooks {
            if playbook.name.is_empty() {
                return Err(StageError::new(
                    stage,
                    ConfigError::InvalidValue {
                        name: "playbooks",
                        reason: "playbook with empty name".to_string(),
                    },
                ));
            }
            if !seen.insert(playbook.name.as_str()) {
                return Err(StageError::new(
                    stage,
                    ConfigError::InvalidValue {
                        name: "playbooks",
                        reason: format!("duplicate playbook {:?}", playbook.name),
                    },
                ));
            }
            if playbook.steps.is_empty() {
                return Err(StageError::new(
                    stage,
                    ConfigError::InvalidValue {
                        name: "playbooks",
                        reason: format!("playbook {:?} has no steps", playbook.name),
                    },
                ));
            }
        }

        info!(playbooks = self.config.playbooks.len(), "safe-mode playbooks ok");
        Ok(())
    }

    /// Stage 4: metric names and playbook steps validate.
    fn stage_metrics_playbooks(&self) -> Result<(), StageError> {
        let stage = BootStage::MetricsPlaybookValidation;

        let mut seen = std::collections::HashSet::new();
        for metric in &self.config.metrics {
            let well_formed = !metric.is_empty()
                && metric
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
            if !well_formed {
                return Err(StageError::new(
                    stage,
                    ConfigError::InvalidValue {
                        name: "metrics",
                        reason: format!("metric name {metric:?} is not snake_case"),
                    },
                ));
            }
            if !seen.insert(metric.as_str()) {
                return Err(StageError::new(
                    stage,
                    ConfigError::InvalidValue {
                        name: "metrics",
                        reason: format!("duplicate metric {metric:?}"),
                    },
                ));
            }
        }

        for playbook in &self.config.playbooks {
            if playbook.steps.iter().any(String::is_empty) {
                return Err(StageError::new(
                    stage,
                    ConfigError::InvalidValue {
                        name: "playbooks",
                        reason: format!("playbook {:?} has an empty step", playbook.name),
                    },
                ));
            }
        }

        info!(metrics = self.config.metrics.len(), "metrics and playbooks ok");
        Ok(())
    }

    /// Stage 5: register and activate every configured service.
    async fn stage_bring_up(&self) -> Result<(), StageError> {
        let stage = BootStage::ServiceBringUp;

        for blueprint in &self.blueprints {
            self.bring_up_service(
                stage,
                Arc::clone(&blueprint.component),
                blueprint.trust_level,
                &blueprint.role_tags,
            )
            .await?;
        }

        info!(services = self.blueprints.len(), "service bring-up complete");
        Ok(())
    }

    /// Stage 6: everything brought up is actually healthy, and the bus
    /// delivers.
    async fn stage_smoke_tests(&self) -> Result<(), StageError> {
        let stage = BootStage::SmokeTests;

        let brought_up: Vec<Arc<dyn Component>> = self.brought_up.lock().clone();
        for component in &brought_up {
            let status = component.get_status();
            if status.state != clarity_component::LifecycleState::Active {
                return Err(StageError::new(
                    stage,
                    StageErrorKind::Smoke(format!(
                        "component {} ({}) is {} after bring-up",
                        status.id, status.type_tag, status.state
                    )),
                ));
            }
        }

        let active = self.ctx.manifest().get_active_components().len();
        if active < brought_up.len() {
            return Err(StageError::new(
                stage,
                StageErrorKind::Smoke(format!(
                    "manifest lists {active} active components, expected at least {}",
                    brought_up.len()
                )),
            ));
        }

        // Loopback: an event published on the bus reaches a subscriber.
        let mut probe = self.ctx.bus().subscribe_stream("boot.smoke", "smoke-check");
        self.ctx
            .bus()
            .publish(Event::new("boot.smoke", self.orchestrator_id))
            .await;
        timeout(Duration::from_secs(1), probe.recv())
            .await
            .ok()
            .flatten()
            .ok_or_else(|| {
                StageError::new(
                    stage,
                    StageErrorKind::Smoke("event bus loopback delivery failed".to_string()),
                )
            })?;

        info!(components = brought_up.len(), "smoke tests ok");
        Ok(())
    }

    /// Stage 7: install the failure-oversight service.
    async fn stage_oversight(&self) -> Result<(), StageError> {
        let stage = BootStage::OversightSetup;

        let oversight = Arc::new(OversightService::new(self.ctx.bus().clone()));
        self.bring_up_service(stage, oversight, TrustLevel::High, &[RoleTag::Oversight])
            .await?;

        info!("oversight service installed");
        Ok(())
    }

    /// Stage 8: record one forensic diagnostics pass and announce it.
    async fn stage_forensics(&self) -> Result<(), StageError> {
        let stage = BootStage::ForensicDiagnostics;

        let mut sweep = LoopOutput::create("forensic-diagnostics", self.orchestrator_id);

        let manifest = self.ctx.manifest();
        let snapshot = manifest.snapshot();
        let mut results = serde_json::Map::new();
        results.insert(
            "components_total".to_string(),
            serde_json::Value::from(snapshot.len()),
        );
        results.insert(
            "components_active".to_string(),
            serde_json::Value::from(snapshot.iter().filter(|entry| entry.active).count()),
        );
        results.insert(
            "events_published".to_string(),
            serde_json::Value::from(self.ctx.bus().events_published()),
        );
        if let Ok(entries) = serde_json::to_value(&snapshot) {
            results.insert("manifest".to_string(), entries);
        }

        sweep
            .mark_completed(results, 1.0)
            .map_err(|err| StageError::new(stage, StageErrorKind::Internal(err.to_string())))?;
        self.ctx.bus().publish(sweep.to_envelope().into_event()).await;

        info!(components = snapshot.len(), "forensic diagnostics recorded");
        Ok(())
    }

    /// Register, activate, and announce one service.
    async fn bring_up_service(
        &self,
        stage: BootStage,
        component: Arc<dyn Component>,
        trust_level: TrustLevel,
        role_tags: &[RoleTag],
    ) -> Result<(), StageError> {
        let id = component.id();
        let type_tag = component.type_tag().to_string();

        self.ctx
            .manifest()
            .register(Arc::clone(&component), trust_level, role_tags)
            .map_err(|err| StageError::new(stage, err))?;

        match component.activate().await {
            Ok(()) => {
                self.ctx
                    .manifest()
                    .update_status(id, true)
                    .map_err(|err| StageError::new(stage, err))?;
                self.ctx
                    .bus()
                    .publish(
                        Event::new(well_known::COMPONENT_ACTIVATED, id)
                            .with_payload("component_type", type_tag.as_str())
                            .with_payload("trust", trust_level.as_str()),
                    )
                    .await;
                self.brought_up.lock().push(component);
                Ok(())
            }
            Err(err) => {
                self.ctx
                    .bus()
                    .publish(
                        Event::new(well_known::COMPONENT_FAILED, id)
                            .with_payload("component_type", type_tag.as_str())
                            .with_payload("error", err.to_string()),
                    )
                    .await;
                Err(StageError::new(stage, err))
            }
        }
    }

    /// Announce a stage outcome on the bus.
    async fn announce_stage(&self, result: &StageResult) {
        let event_type = match result.status {
            StageStatus::Passed => well_known::BOOT_STAGE_COMPLETED,
            StageStatus::Failed => well_known::BOOT_STAGE_FAILED,
        };
        let mut event = Event::new(event_type, self.orchestrator_id)
            .with_payload("stage", result.stage.name())
            .with_payload("index", result.index as u64)
            .with_payload("duration_ms", result.duration_ms);
        if let Some(error) = &result.error {
            event = event.with_payload("error", error.as_str());
        }
        self.ctx.bus().publish(event).await;
    }
}
