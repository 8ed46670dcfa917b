//! Ingestion pipeline
//!
//! Runs an upload as a state machine:
//!
//! ```text
//! Idle -> Validated -> CreatingTable -> Inserting -> Completed
//!                           |               |-> InsertFailed
//!                           |-> CreateFailed |-> Cancelled
//!                           |-> Cancelled
//! ```
//!
//! Terminal phases return to `Idle` only through a reset.

pub mod executor;
pub mod progress;
pub mod run;

pub use executor::IngestionExecutor;
pub use progress::{CancellationFlag, Progress, ProgressReporter};
pub use run::{IngestionRun, Phase};

use crate::batch::PlanError;
use crate::import::ImportError;
use crate::validation::ValidationReport;

/// Error during an ingestion run
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Failed to parse file: {0}")]
    Parse(#[from] ImportError),

    #[error("Validation failed: {0}")]
    Validation(ValidationReport),

    #[error("Table creation failed: {0}")]
    CreateFailed(String),

    #[error(
        "Batch {} of {total_batches} failed after {completed_batches} completed: {message}",
        .batch_index + 1
    )]
    InsertFailed {
        batch_index: usize,
        completed_batches: usize,
        total_batches: usize,
        message: String,
    },

    #[error("Upload cancelled after {completed_batches} of {total_batches} batches")]
    Cancelled {
        completed_batches: usize,
        total_batches: usize,
    },

    #[error("Executor is not idle (phase: {0}); reset before starting a new run")]
    NotIdle(Phase),

    #[error("Invalid phase transition: {from} -> {to}")]
    InvalidTransition { from: Phase, to: Phase },

    #[error(transparent)]
    Plan(#[from] PlanError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = IngestError::InsertFailed {
            batch_index: 2,
            completed_batches: 2,
            total_batches: 5,
            message: "timeout".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Batch 3 of 5 failed after 2 completed: timeout"
        );
        assert_eq!(
            IngestError::NotIdle(Phase::Completed).to_string(),
            "Executor is not idle (phase: completed); reset before starting a new run"
        );
    }
}
