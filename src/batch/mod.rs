//! Batch planning
//!
//! Splits dataset rows into contiguous, bounded slices. Each batch becomes
//! one `INSERT` statement.

use crate::models::RawRow;

/// Default number of rows per batch
pub const BATCH_SIZE: usize = 100;

/// A contiguous slice of rows sent as one statement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Batch<'a> {
    /// Zero-based position of the batch in the plan
    pub index: usize,
    pub rows: &'a [RawRow],
}

impl Batch<'_> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Error during batch planning
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    #[error("Batch size must be greater than zero")]
    ZeroBatchSize,
}

/// Number of batches needed for `len` rows: `ceil(len / batch_size)`.
/// Zero rows need zero batches.
pub fn batch_count(len: usize, batch_size: usize) -> Result<usize, PlanError> {
    if batch_size == 0 {
        return Err(PlanError::ZeroBatchSize);
    }
    Ok(len.div_ceil(batch_size))
}

/// Split rows into batches of exactly `batch_size`, except the last.
///
/// # Example
///
/// ```rust
/// use table_upload_sdk::batch::plan;
/// use table_upload_sdk::models::CellValue;
///
/// let rows = vec![vec![CellValue::Null]; 250];
/// let batches = plan(&rows, 100).unwrap();
/// assert_eq!(batches.len(), 3);
/// assert_eq!(batches[2].rows.len(), 50);
/// ```
pub fn plan(rows: &[RawRow], batch_size: usize) -> Result<Vec<Batch<'_>>, PlanError> {
    if batch_size == 0 {
        return Err(PlanError::ZeroBatchSize);
    }
    Ok(rows
        .chunks(batch_size)
        .enumerate()
        .map(|(index, rows)| Batch { index, rows })
        .collect())
}
