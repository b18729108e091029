//! Boot stages and the boot report.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::CRITICAL_EXIT_CODE;

/// The ordered stages of the boot pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BootStage {
    /// Stage 0: environment sanity.
    EnvironmentCheck,
    /// Stage 1: runtime dependency limits.
    DependencyCheck,
    /// Stage 2: required secrets and schema settings.
    SchemaSecretValidation,
    /// Stage 3: safe-mode playbook definitions.
    SafeModePlaybooks,
    /// Stage 4: metric names and playbook steps.
    MetricsPlaybookValidation,
    /// Stage 5: register and activate the configured services.
    ServiceBringUp,
    /// Stage 6: verify brought-up services and bus delivery.
    SmokeTests,
    /// Stage 7: install the failure-oversight service.
    OversightSetup,
    /// Stage 8: record a forensic diagnostics pass.
    ForensicDiagnostics,
}

/// All stages in execution order.
const ALL_STAGES: [BootStage; 9] = [
    BootStage::EnvironmentCheck,
    BootStage::DependencyCheck,
    BootStage::SchemaSecretValidation,
    BootStage::SafeModePlaybooks,
    BootStage::MetricsPlaybookValidation,
    BootStage::ServiceBringUp,
    BootStage::SmokeTests,
    BootStage::OversightSetup,
    BootStage::ForensicDiagnostics,
];

/// Stages covered by safe mode: validation only, no live services.
const SAFE_MODE_STAGES: usize = 5;

impl BootStage {
    /// Zero-based position in the pipeline.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::EnvironmentCheck => 0,
            Self::DependencyCheck => 1,
            Self::SchemaSecretValidation => 2,
            Self::SafeModePlaybooks => 3,
            Self::MetricsPlaybookValidation => 4,
            Self::ServiceBringUp => 5,
            Self::SmokeTests => 6,
            Self::OversightSetup => 7,
            Self::ForensicDiagnostics => 8,
        }
    }

    /// Stage name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::EnvironmentCheck => "environment-check",
            Self::DependencyCheck => "dependency-check",
            Self::SchemaSecretValidation => "schema-secret-validation",
            Self::SafeModePlaybooks => "safe-mode-playbooks",
            Self::MetricsPlaybookValidation => "metrics-playbook-validation",
            Self::ServiceBringUp => "service-bring-up",
            Self::SmokeTests => "smoke-tests",
            Self::OversightSetup => "oversight-setup",
            Self::ForensicDiagnostics => "forensic-diagnostics",
        }
    }

    /// All stages in order.
    #[must_use]
    pub fn all() -> &'static [BootStage] {
        &ALL_STAGES
    }

    /// Process exit code when this is the first failing stage.
    ///
    /// Exit codes identify the failing stage within the documented 1-8
    /// range; stage 0 shares code 1 with stage 1, both being preflight
    /// checks.
    #[must_use]
    pub fn exit_code(self) -> i32 {
        (self.index().max(1)) as i32
    }
}

impl fmt::Display for BootStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which part of the pipeline to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BootScope {
    /// All nine stages.
    Full,
    /// Validation stages 0-4 only; no live services are started.
    SafeMode,
}

impl BootScope {
    /// Stages covered by this scope, in execution order.
    #[must_use]
    pub fn stages(self) -> &'static [BootStage] {
        match self {
            Self::Full => &ALL_STAGES,
            Self::SafeMode => &ALL_STAGES[..SAFE_MODE_STAGES],
        }
    }
}

/// Outcome of one attempted stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    /// The stage completed.
    Passed,
    /// The stage failed; the pipeline halted here.
    Failed,
}

/// Structured result of one attempted stage.
#[derive(Debug, Clone, Serialize)]
pub struct StageResult {
    /// Which stage ran.
    pub stage: BootStage,
    /// Zero-based stage index.
    pub index: usize,
    /// Outcome.
    pub status: StageStatus,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
    /// Failure description, when failed.
    pub error: Option<String>,
}

/// Overall outcome of a boot run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    /// Every attempted stage passed.
    Success,
    /// A stage failed and halted the pipeline.
    Failed,
}

/// The structured report returned by a boot run.
///
/// Contains one entry per *attempted* stage in order; stages after the
/// first failure are never attempted and never listed.
#[derive(Debug, Clone, Serialize)]
pub struct BootReport {
    /// The scope that was requested.
    pub scope: BootScope,
    /// Overall outcome.
    pub overall: OverallStatus,
    /// Results of the attempted stages, in order.
    pub results: Vec<StageResult>,
    /// Run start timestamp.
    pub started_at: DateTime<Utc>,
    /// Run end timestamp.
    pub finished_at: DateTime<Utc>,
}

impl BootReport {
    /// Process exit code for this run: 0 on success, the first failing
    /// stage's code otherwise.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self.overall {
            OverallStatus::Success => 0,
            OverallStatus::Failed => self
                .results
                .iter()
                .find(|result| result.status == StageStatus::Failed)
                .map(|result| result.stage.exit_code())
                .unwrap_or(CRITICAL_EXIT_CODE),
        }
    }

    /// Result of a specific stage, if it was attempted.
    #[must_use]
    pub fn stage_result(&self, stage: BootStage) -> Option<&StageResult> {
        self.results.iter().find(|result| result.stage == stage)
    }
}
