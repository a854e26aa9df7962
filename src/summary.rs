// src/summary.rs

//! End-of-run summary aggregation.
//!
//! Recomputes MAX/MIN/AVG rows and a failed-student count over every data
//! row currently in the store and appends them as a four-row block. The
//! block is always recomputed from scratch; running it again appends
//! another block (matching the original sheet behavior).

use crate::error::Result;
use crate::models::{ResultRecord, SUMMARY_ENROLLMENT, SUMMARY_LABELS, Score};
use crate::store::ResultStore;

/// The four synthetic rows appended after the data rows.
#[derive(Debug, Clone)]
pub struct SummaryBlock {
    pub rows: [ResultRecord; 4],
    /// Records with a current-term backlog strictly greater than zero
    pub failed_students: usize,
}

/// Aggregate over one numeric column, skipping missing values.
#[derive(Debug, Default)]
struct ColumnStats {
    values: Vec<f64>,
}

impl ColumnStats {
    fn push(&mut self, score: Score) {
        if let Some(v) = score.value() {
            self.values.push(v);
        }
    }

    fn max(&self) -> Score {
        Score(self.values.iter().copied().reduce(f64::max))
    }

    fn min(&self) -> Score {
        Score(self.values.iter().copied().reduce(f64::min))
    }

    fn avg(&self) -> Score {
        if self.values.is_empty() {
            return Score::missing();
        }
        let mean = self.values.iter().sum::<f64>() / self.values.len() as f64;
        Score(Some(round2(mean)))
    }
}

/// Round to two decimal places.
fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Compute the summary block over the given data rows.
///
/// Missing scores are excluded from MAX/MIN/AVG, never treated as zero. The
/// failed-student row carries the count in its `Current_Sem_Back` column;
/// its trailing four columns are hard-zeroed by sheet convention.
pub fn compute_summary(records: &[ResultRecord]) -> SummaryBlock {
    let mut current = ColumnStats::default();
    let mut total = ColumnStats::default();
    let mut spi = ColumnStats::default();
    let mut cpi = ColumnStats::default();
    let mut cgpa = ColumnStats::default();

    let mut failed_students = 0;
    for record in records {
        current.push(record.current_sem_back);
        total.push(record.total_back);
        spi.push(record.spi);
        cpi.push(record.cpi);
        cgpa.push(record.cgpa);

        if record.current_sem_back.value().is_some_and(|v| v > 0.0) {
            failed_students += 1;
        }
    }

    let synthetic = |name: &str,
                     current_sem_back: Score,
                     total_back: Score,
                     spi: Score,
                     cpi: Score,
                     cgpa: Score| ResultRecord {
        name: name.to_string(),
        enrollment: SUMMARY_ENROLLMENT.to_string(),
        current_sem_back,
        total_back,
        spi,
        cpi,
        cgpa,
    };

    let rows = [
        synthetic(
            SUMMARY_LABELS[0],
            current.max(),
            total.max(),
            spi.max(),
            cpi.max(),
            cgpa.max(),
        ),
        synthetic(
            SUMMARY_LABELS[1],
            current.min(),
            total.min(),
            spi.min(),
            cpi.min(),
            cgpa.min(),
        ),
        synthetic(
            SUMMARY_LABELS[2],
            current.avg(),
            total.avg(),
            spi.avg(),
            cpi.avg(),
            cgpa.avg(),
        ),
        synthetic(
            SUMMARY_LABELS[3],
            (failed_students as f64).into(),
            0.0.into(),
            0.0.into(),
            0.0.into(),
            0.0.into(),
        ),
    ];

    SummaryBlock {
        rows,
        failed_students,
    }
}

/// Recompute the summary over the store's data rows and append it.
///
/// Prior summary blocks are filtered out of the computation (by their
/// `" - "` enrollment marker) but are left in place in the file. Returns
/// `None` when no table exists yet.
pub fn append_summary(store: &dyn ResultStore) -> Result<Option<SummaryBlock>> {
    if !store.exists() {
        log::warn!("No result table to summarize");
        return Ok(None);
    }

    let records = store.load_all(false)?;
    let block = compute_summary(&records);
    store.append_rows(&block.rows)?;

    log::info!(
        "Summary block appended over {} records ({} with current-term backlog)",
        records.len(),
        block.failed_students
    );
    Ok(Some(block))
}
