//! Loop output recorder.
//!
//! One `LoopOutput` captures the outcome of a single execution pass of a
//! processing routine. The recorder enforces the envelope invariants —
//! `completed_at >= started_at` on any terminal status, confidence inside
//! the inclusive `0..=1` range and only on SUCCESS, results frozen once
//! terminal — and hands external consumers an immutable [`LoopEnvelope`].
//! Persistence and transport of the envelope belong to those consumers.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use clarity_types::{well_known, ComponentId, Event};

/// Status of a processing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopStatus {
    /// Still executing.
    Running,
    /// Completed with results and a confidence score.
    Success,
    /// Terminated with an error.
    Failed,
}

impl LoopStatus {
    /// Canonical lowercase label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for LoopStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from the loop output recorder.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LoopError {
    /// Confidence must be inside the inclusive `0..=1` range.
    #[error("confidence {0} outside inclusive range 0..=1")]
    ConfidenceOutOfRange(f64),

    /// The output already reached a terminal status; it is frozen.
    #[error("loop output is already {0}")]
    AlreadyTerminal(LoopStatus),
}

/// Record of one execution pass of a processing routine.
#[derive(Debug, Clone)]
pub struct LoopOutput {
    loop_type: String,
    component_id: ComponentId,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    status: LoopStatus,
    confidence: Option<f64>,
    results: Map<String, Value>,
    error: Option<String>,
}

impl LoopOutput {
    /// Allocate a RUNNING output with `started_at = now`.
    #[must_use]
    pub fn create(loop_type: impl Into<String>, component_id: ComponentId) -> Self {
        Self {
            loop_type: loop_type.into(),
            component_id,
            started_at: Utc::now(),
            completed_at: None,
            status: LoopStatus::Running,
            confidence: None,
            results: Map::new(),
            error: None,
        }
    }

    /// Mark SUCCESS with results and a confidence score.
    ///
    /// Rejects confidence outside `0..=1` with a range error and leaves the
    /// output untouched. Rejects a second completion of a terminal output.
    pub fn mark_completed(
        &mut self,
        results: Map<String, Value>,
        confidence: f64,
    ) -> Result<(), LoopError> {
        if self.status != LoopStatus::Running {
            return Err(LoopError::AlreadyTerminal(self.status));
        }
        if !(0.0..=1.0).contains(&confidence) || confidence.is_nan() {
            return Err(LoopError::ConfidenceOutOfRange(confidence));
        }

        self.results = results;
        self.confidence = Some(confidence);
        self.completed_at = Some(Utc::now());
        self.status = LoopStatus::Success;
        Ok(())
    }

    /// Mark FAILED with error detail.
    pub fn mark_failed(&mut self, error: impl Into<String>) -> Result<(), LoopError> {
        if self.status != LoopStatus::Running {
            return Err(LoopError::AlreadyTerminal(self.status));
        }

        self.error = Some(error.into());
        self.completed_at = Some(Utc::now());
        self.status = LoopStatus::Failed;
        Ok(())
    }

    /// Loop type label.
    #[must_use]
    pub fn loop_type(&self) -> &str {
        &self.loop_type
    }

    /// Owning component.
    #[must_use]
    pub fn component_id(&self) -> ComponentId {
        self.component_id
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> LoopStatus {
        self.status
    }

    /// Confidence score; present only after SUCCESS.
    #[must_use]
    pub fn confidence(&self) -> Option<f64> {
        self.confidence
    }

    /// Start timestamp.
    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Completion timestamp; absent while RUNNING.
    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Results mapping.
    #[must_use]
    pub fn results(&self) -> &Map<String, Value> {
        &self.results
    }

    /// Wall-clock time since start, or total duration once terminal.
    #[must_use]
    pub fn elapsed(&self) -> chrono::Duration {
        self.completed_at.unwrap_or_else(Utc::now) - self.started_at
    }

    /// Whether the pass reached SUCCESS or FAILED.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.status != LoopStatus::Running
    }

    /// Immutable serializable snapshot for external consumers.
    #[must_use]
    pub fn to_envelope(&self) -> LoopEnvelope {
        LoopEnvelope {
            loop_type: self.loop_type.clone(),
            component_id: self.component_id,
            started_at: self.started_at,
            completed_at: self.completed_at,
            status: self.status,
            confidence: self.confidence,
            results: self.results.clone(),
            error: self.error.clone(),
        }
    }
}

/// Immutable, serializable snapshot of a [`LoopOutput`].
///
/// This is the transport form handed to API layers, logging, and storage;
/// the recorder itself never persists or transmits it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopEnvelope {
    /// Loop type label.
    pub loop_type: String,
    /// Owning component.
    pub component_id: ComponentId,
    /// Start timestamp.
    pub started_at: DateTime<Utc>,
    /// Completion timestamp; absent while RUNNING.
    pub completed_at: Option<DateTime<Utc>>,
    /// Final (or current) status.
    pub status: LoopStatus,
    /// Confidence; present only on SUCCESS.
    pub confidence: Option<f64>,
    /// Results mapping.
    pub results: Map<String, Value>,
    /// Error detail; present only on FAILED.
    pub error: Option<String>,
}

impl LoopEnvelope {
    /// Wrap the envelope as a `loop.completed` event for bus emission.
    #[must_use]
    pub fn into_event(self) -> Event {
        let source = self.component_id;
        let mut event = Event::new(well_known::LOOP_COMPLETED, source);
        if let Ok(Value::Object(fields)) = serde_json::to_value(&self) {
            event.payload = fields;
        }
        event
    }
}
