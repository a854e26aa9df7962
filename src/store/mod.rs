//! Result table persistence.
//!
//! One CSV file holds the whole run: a header row, one data row per saved
//! student, then any summary blocks appended at the end. The enrollment
//! column is text throughout so leading zeros survive every rewrite.
//!
//! The load-mutate-save cycle assumes a single writer for the duration of
//! a run; there is no cross-process locking around the table file.

pub mod csv;

use crate::error::Result;
use crate::models::ResultRecord;

// Re-export for convenience
pub use csv::CsvStore;

/// Trait for result table backends.
pub trait ResultStore {
    /// Whether a backing table already exists.
    fn exists(&self) -> bool;

    /// Append one record, creating the table (with its header) on first use.
    ///
    /// Every call is a full load-mutate-save cycle; nothing accumulates in
    /// memory across calls, so a crash between records loses at most the
    /// in-flight record.
    fn append_or_create(&self, record: &ResultRecord) -> Result<()>;

    /// Load every persisted row in file order.
    ///
    /// Summary rows (enrollment `" - "`) are filtered out unless
    /// `include_summary` is set.
    fn load_all(&self, include_summary: bool) -> Result<Vec<ResultRecord>>;

    /// Append a batch of rows after everything already persisted.
    fn append_rows(&self, rows: &[ResultRecord]) -> Result<()>;
}
