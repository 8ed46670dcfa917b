//! Progress reporting and cancellation

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

/// Batch progress of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub completed_batches: usize,
    pub total_batches: usize,
    /// 0-100
    pub percent: u8,
}

impl Progress {
    /// Progress for `completed` of `total` batches. No batches at all counts
    /// as done.
    pub fn new(completed_batches: usize, total_batches: usize) -> Self {
        let percent = if total_batches == 0 {
            100
        } else {
            (completed_batches * 100 / total_batches) as u8
        };
        Self {
            completed_batches,
            total_batches,
            percent,
        }
    }
}

/// Receives progress updates from the executor
pub trait ProgressReporter {
    fn report(&mut self, progress: Progress);
}

impl<F> ProgressReporter for F
where
    F: FnMut(Progress),
{
    fn report(&mut self, progress: Progress) {
        self(progress)
    }
}

/// Shared cancellation flag.
///
/// Clones share the same flag. The executor checks it before the table is
/// created and before every batch.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percent() {
        assert_eq!(Progress::new(0, 4).percent, 0);
        assert_eq!(Progress::new(1, 3).percent, 33);
        assert_eq!(Progress::new(4, 4).percent, 100);
        assert_eq!(Progress::new(0, 0).percent, 100);
    }

    #[test]
    fn test_closure_reporter() {
        let mut seen = Vec::new();
        {
            let mut reporter = |p: Progress| seen.push(p.completed_batches);
            reporter.report(Progress::new(1, 2));
            reporter.report(Progress::new(2, 2));
        }
        assert_eq!(seen, vec![1, 2]);
    }

    #[test]
    fn test_cancellation_is_shared() {
        let flag = CancellationFlag::new();
        let other = flag.clone();
        other.cancel();
        assert!(flag.is_cancelled());
        flag.clear();
        assert!(!other.is_cancelled());
    }
}
