//! Collaborator ports.
//!
//! The orchestrator consumes three external collaborators through these
//! traits: a secrets/config source, a snapshot store, and a report sink.
//! The core never persists or transmits anything itself — the adapters
//! here either read the environment or hand the document to the log
//! stream, and deployments substitute their own implementations.

use tracing::info;

use clarity_types::ConfigError;

use crate::stage::{BootReport, BootStage, StageResult};

/// Source of required secrets.
///
/// Values are fetched here and *validated* by the schema/secret stage;
/// a missing key surfaces as a [`ConfigError`].
pub trait SecretsSource: Send + Sync {
    /// The signing secret, hex-encoded.
    fn signing_secret(&self) -> Result<String, ConfigError>;

    /// The database connection string.
    fn database_url(&self) -> Result<String, ConfigError>;
}

/// Reads secrets from `CLARITY_SIGNING_SECRET` / `CLARITY_DATABASE_URL`.
pub struct EnvSecretsSource;

impl SecretsSource for EnvSecretsSource {
    fn signing_secret(&self) -> Result<String, ConfigError> {
        std::env::var("CLARITY_SIGNING_SECRET")
            .map_err(|_| ConfigError::MissingSecret("CLARITY_SIGNING_SECRET"))
    }

    fn database_url(&self) -> Result<String, ConfigError> {
        std::env::var("CLARITY_DATABASE_URL")
            .map_err(|_| ConfigError::MissingSecret("CLARITY_DATABASE_URL"))
    }
}

/// Fixed secrets for tests and embedded use.
pub struct StaticSecrets {
    /// Hex-encoded signing secret.
    pub signing_secret: String,
    /// Database connection string.
    pub database_url: String,
}

impl StaticSecrets {
    /// A valid development secret set: a 32-byte signing secret and a
    /// local database URL.
    #[must_use]
    pub fn development() -> Self {
        Self {
            signing_secret: "11".repeat(32),
            database_url: "postgres://localhost/clarity".to_string(),
        }
    }
}

impl SecretsSource for StaticSecrets {
    fn signing_secret(&self) -> Result<String, ConfigError> {
        Ok(self.signing_secret.clone())
    }

    fn database_url(&self) -> Result<String, ConfigError> {
        Ok(self.database_url.clone())
    }
}

/// Receiver of pre-boot and post-stage snapshots.
///
/// The collaborator owns what a snapshot captures and where it goes; the
/// orchestrator only signals the moments.
pub trait SnapshotStore: Send + Sync {
    /// Called once before stage 0.
    fn pre_boot(&self);

    /// Called after every attempted stage with its result.
    fn post_stage(&self, stage: BootStage, result: &StageResult);
}

/// Snapshot store that records the signal points in the log stream.
pub struct LoggingSnapshotStore;

impl SnapshotStore for LoggingSnapshotStore {
    fn pre_boot(&self) {
        info!("pre-boot snapshot point");
    }

    fn post_stage(&self, stage: BootStage, result: &StageResult) {
        info!(
            stage = %stage,
            status = ?result.status,
            duration_ms = result.duration_ms,
            "post-stage snapshot point"
        );
    }
}

/// No-op snapshot store for tests.
pub struct NullSnapshotStore;

impl SnapshotStore for NullSnapshotStore {
    fn pre_boot(&self) {}

    fn post_stage(&self, _stage: BootStage, _result: &StageResult) {}
}

/// Writer of the final boot report document.
pub trait ReportSink: Send + Sync {
    /// Write the report.
    fn write(&self, report: &BootReport) -> anyhow::Result<()>;
}

/// Report sink that emits the report as one JSON document to the log
/// stream.
pub struct LoggingReportSink;

impl ReportSink for LoggingReportSink {
    fn write(&self, report: &BootReport) -> anyhow::Result<()> {
        let document = serde_json::to_string_pretty(report)?;
        info!(exit_code = report.exit_code(), "boot report:\n{document}");
        Ok(())
    }
}
