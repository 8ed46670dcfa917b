//! Ingestion run state

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::IngestError;

/// Phase of an ingestion run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Validated,
    CreatingTable,
    Inserting,
    Completed,
    CreateFailed,
    InsertFailed,
    Cancelled,
}

impl Phase {
    /// Terminal phases only leave through a reset
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Phase::Completed | Phase::CreateFailed | Phase::InsertFailed | Phase::Cancelled
        )
    }

    /// Whether `self -> to` is an edge of the run lifecycle
    pub fn can_transition_to(&self, to: Phase) -> bool {
        matches!(
            (self, to),
            (Phase::Idle, Phase::Validated)
                | (Phase::Validated, Phase::CreatingTable)
                | (Phase::CreatingTable, Phase::Inserting)
                | (Phase::CreatingTable, Phase::CreateFailed)
                | (Phase::CreatingTable, Phase::Cancelled)
                | (Phase::Inserting, Phase::Completed)
                | (Phase::Inserting, Phase::InsertFailed)
                | (Phase::Inserting, Phase::Cancelled)
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Validated => "validated",
            Phase::CreatingTable => "creating table",
            Phase::Inserting => "inserting",
            Phase::Completed => "completed",
            Phase::CreateFailed => "create failed",
            Phase::InsertFailed => "insert failed",
            Phase::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// State of one upload attempt.
///
/// Mutated only by the executor. A retry starts from a fresh run after
/// [`IngestionRun::reset`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionRun {
    run_id: Uuid,
    phase: Phase,
    total_batches: usize,
    completed_batches: usize,
    last_error: Option<String>,
    failed_batch: Option<usize>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl Default for IngestionRun {
    fn default() -> Self {
        Self::new()
    }
}

impl IngestionRun {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            phase: Phase::Idle,
            total_batches: 0,
            completed_batches: 0,
            last_error: None,
            failed_batch: None,
            started_at: None,
            finished_at: None,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn total_batches(&self) -> usize {
        self.total_batches
    }

    pub fn completed_batches(&self) -> usize {
        self.completed_batches
    }

    /// Engine message of the failure that ended the run, verbatim
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Index of the batch whose insert failed
    pub fn failed_batch(&self) -> Option<usize> {
        self.failed_batch
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Move to another phase. Edges outside the lifecycle graph are
    /// rejected and leave the run untouched.
    pub fn transition(&mut self, to: Phase) -> Result<(), IngestError> {
        if !self.phase.can_transition_to(to) {
            return Err(IngestError::InvalidTransition {
                from: self.phase,
                to,
            });
        }
        debug!("Run {}: {} -> {}", self.run_id, self.phase, to);
        if self.phase == Phase::Idle {
            self.started_at = Some(Utc::now());
        }
        if to.is_terminal() {
            self.finished_at = Some(Utc::now());
        }
        self.phase = to;
        Ok(())
    }

    /// Return to `Idle` with a new run id and cleared counters
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub(crate) fn set_total_batches(&mut self, total: usize) {
        self.total_batches = total;
    }

    pub(crate) fn complete_batch(&mut self) {
        self.completed_batches += 1;
    }

    pub(crate) fn record_failure(&mut self, message: String, batch: Option<usize>) {
        self.last_error = Some(message);
        self.failed_batch = batch;
    }

    /// Completed share of the batches, 0-100. A run with no batches is at
    /// 100 once it completes.
    pub fn percent(&self) -> u8 {
        if self.total_batches == 0 {
            if self.phase == Phase::Completed { 100 } else { 0 }
        } else {
            (self.completed_batches * 100 / self.total_batches) as u8
        }
    }

    /// Elapsed time of the run; still ticking while it is in progress
    pub fn duration(&self) -> Option<chrono::Duration> {
        let started = self.started_at?;
        Some(self.finished_at.unwrap_or_else(Utc::now) - started)
    }

    /// Format duration as human-readable string
    pub fn duration_string(&self) -> String {
        let secs = self.duration().map(|d| d.num_seconds().max(0)).unwrap_or(0);
        if secs < 60 {
            format!("{}s", secs)
        } else if secs < 3600 {
            format!("{}m {}s", secs / 60, secs % 60)
        } else {
            format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
        }
    }
}
