//! Boot configuration.
//!
//! Defaults are development-safe; production deployments override through
//! `CLARITY_*` environment variables. Secrets are not configuration — they
//! come through the [`crate::ports::SecretsSource`] collaborator and are
//! validated by the schema/secret stage.

use clarity_bus::{BusConfig, DEFAULT_QUEUE_CAPACITY};

/// A named safe-mode playbook: an ordered list of operator steps validated
/// during the playbook stages.
#[derive(Debug, Clone)]
pub struct Playbook {
    /// Unique playbook name.
    pub name: String,
    /// Ordered, non-empty steps.
    pub steps: Vec<String>,
}

impl Playbook {
    /// Build a playbook.
    #[must_use]
    pub fn new(name: impl Into<String>, steps: &[&str]) -> Self {
        Self {
            name: name.into(),
            steps: steps.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

/// Complete boot configuration.
#[derive(Debug, Clone)]
pub struct BootConfig {
    /// Deployment environment label: development, staging, or production.
    pub environment: String,
    /// Run only the validation prefix of the pipeline (stages 0-4).
    pub safe_mode: bool,
    /// Per-stage execution budget in seconds.
    pub stage_timeout_secs: u64,
    /// Pulse service heartbeat interval in seconds.
    pub heartbeat_interval_secs: u64,
    /// Event bus per-subscription queue capacity.
    pub queue_capacity: usize,
    /// Event bus worker-pool size.
    pub worker_permits: usize,
    /// Safe-mode playbooks validated at stage 3.
    pub playbooks: Vec<Playbook>,
    /// Metric names validated at stage 4.
    pub metrics: Vec<String>,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            safe_mode: false,
            stage_timeout_secs: 30,
            heartbeat_interval_secs: 5,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            worker_permits: num_cpus::get().max(2),
            playbooks: vec![
                Playbook::new(
                    "halt-services",
                    &["deactivate active components", "flush event queues"],
                ),
                Playbook::new(
                    "read-only",
                    &["reject mutating operations", "keep queries available"],
                ),
            ],
            metrics: vec![
                "components_active".to_string(),
                "events_published".to_string(),
                "loops_completed".to_string(),
            ],
        }
    }
}

impl BootConfig {
    /// Load configuration from the environment, starting from defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(environment) = std::env::var("CLARITY_ENV") {
            config.environment = environment;
        }
        if let Ok(safe_mode) = std::env::var("CLARITY_SAFE_MODE") {
            config.safe_mode = safe_mode == "1" || safe_mode.eq_ignore_ascii_case("true");
        }
        if let Ok(timeout) = std::env::var("CLARITY_STAGE_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse() {
                config.stage_timeout_secs = secs;
            }
        }
        if let Ok(interval) = std::env::var("CLARITY_HEARTBEAT_SECS") {
            if let Ok(secs) = interval.parse() {
                config.heartbeat_interval_secs = secs;
            }
        }
        if let Ok(capacity) = std::env::var("CLARITY_QUEUE_CAPACITY") {
            if let Ok(n) = capacity.parse() {
                config.queue_capacity = n;
            }
        }
        if let Ok(permits) = std::env::var("CLARITY_WORKER_PERMITS") {
            if let Ok(n) = permits.parse() {
                config.worker_permits = n;
            }
        }

        config
    }

    /// Bus tuning derived from this configuration.
    #[must_use]
    pub fn bus_config(&self) -> BusConfig {
        BusConfig {
            queue_capacity: self.queue_capacity,
            worker_permits: self.worker_permits,
        }
    }
}
