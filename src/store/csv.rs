//! CSV-backed result store.
//!
//! Layout matches the original spreadsheet: header
//! `Name, Enrollment_No, Current_Sem_Back, Total_Back, SPI, CPI, CGPA`,
//! one row per student, summary blocks last.
//!
//! Every append re-reads and rewrites the whole file. Total write cost over
//! a run is O(n²) in the batch size; at the tens-to-hundreds of records this
//! tool targets that is an acceptable price for per-record durability.

use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::models::ResultRecord;
use crate::store::ResultStore;

/// File extension the output table must carry.
pub const TABLE_EXTENSION: &str = "csv";

/// CSV file store for result records.
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    /// Create a store for the given path. The file itself is only created by
    /// the first append.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case(TABLE_EXTENSION) => Ok(Self { path }),
            _ => Err(AppError::validation(format!(
                "output file {:?} must end in .{}",
                path, TABLE_EXTENSION
            ))),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every row from the backing file.
    fn read_rows(&self) -> Result<Vec<ResultRecord>> {
        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut rows = Vec::new();
        for row in reader.deserialize::<ResultRecord>() {
            rows.push(row?);
        }
        Ok(rows)
    }

    /// Rewrite the backing file with the given rows (write to a temp file,
    /// then rename, so a crash mid-write cannot truncate the table).
    fn write_rows(&self, rows: &[ResultRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("tmp");
        {
            let mut writer = csv::Writer::from_path(&tmp)?;
            for row in rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl ResultStore for CsvStore {
    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn append_or_create(&self, record: &ResultRecord) -> Result<()> {
        let mut rows = if self.exists() {
            self.read_rows()?
        } else {
            Vec::new()
        };
        rows.push(record.clone());
        self.write_rows(&rows)
    }

    fn load_all(&self, include_summary: bool) -> Result<Vec<ResultRecord>> {
        if !self.exists() {
            return Ok(Vec::new());
        }
        let rows = self.read_rows()?;
        if include_summary {
            Ok(rows)
        } else {
            Ok(rows.into_iter().filter(|r| !r.is_summary()).collect())
        }
    }

    fn append_rows(&self, new_rows: &[ResultRecord]) -> Result<()> {
        let mut rows = if self.exists() {
            self.read_rows()?
        } else {
            Vec::new()
        };
        rows.extend_from_slice(new_rows);
        self.write_rows(&rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SUMMARY_ENROLLMENT, Score};
    use tempfile::TempDir;

    fn record(enrollment: &str, name: &str, spi: f64) -> ResultRecord {
        ResultRecord {
            name: name.to_string(),
            enrollment: enrollment.to_string(),
            current_sem_back: 0.0.into(),
            total_back: 0.0.into(),
            spi: spi.into(),
            cpi: spi.into(),
            cgpa: spi.into(),
        }
    }

    fn store_in(tmp: &TempDir) -> CsvStore {
        CsvStore::new(tmp.path().join("results.csv")).unwrap()
    }

    #[test]
    fn rejects_non_csv_extension() {
        assert!(CsvStore::new("results.xlsx").is_err());
        assert!(CsvStore::new("results").is_err());
        assert!(CsvStore::new("results.csv").is_ok());
    }

    #[test]
    fn append_creates_then_grows_the_table() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);
        assert!(!store.exists());

        store.append_or_create(&record("123456789001", "A", 7.0)).unwrap();
        assert!(store.exists());
        store.append_or_create(&record("123456789002", "B", 8.0)).unwrap();
        store.append_or_create(&record("123456789003", "C", 6.5)).unwrap();

        let rows = store.load_all(false).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].name, "A");
        assert_eq!(rows[2].enrollment, "123456789003");
    }

    #[test]
    fn enrollment_round_trips_as_text() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);

        store.append_or_create(&record("000123456001", "A", 7.0)).unwrap();
        store.append_or_create(&record("000123456002", "B", 8.0)).unwrap();

        let rows = store.load_all(false).unwrap();
        assert_eq!(rows[0].enrollment, "000123456001");
        assert_eq!(rows[1].enrollment, "000123456002");
    }

    #[test]
    fn header_matches_the_sheet_layout() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);
        store.append_or_create(&record("123456789001", "A", 7.0)).unwrap();

        let content = std::fs::read_to_string(store.path()).unwrap();
        let header = content.lines().next().unwrap();
        assert_eq!(
            header,
            "Name,Enrollment_No,Current_Sem_Back,Total_Back,SPI,CPI,CGPA"
        );
    }

    #[test]
    fn load_all_filters_summary_rows() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);
        store.append_or_create(&record("123456789001", "A", 7.0)).unwrap();
        store
            .append_rows(&[record(SUMMARY_ENROLLMENT, "MAX", 7.0)])
            .unwrap();

        assert_eq!(store.load_all(false).unwrap().len(), 1);
        assert_eq!(store.load_all(true).unwrap().len(), 2);
    }

    #[test]
    fn missing_scores_survive_a_rewrite() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);
        let mut rec = record("123456789001", "A", 7.0);
        rec.spi = Score::missing();
        store.append_or_create(&rec).unwrap();
        store.append_or_create(&record("123456789002", "B", 8.0)).unwrap();

        let rows = store.load_all(false).unwrap();
        assert_eq!(rows[0].spi.value(), None);
        assert_eq!(rows[1].spi.value(), Some(8.0));
    }

    #[test]
    fn corrupt_table_is_a_fatal_error() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);

        // Row with too few columns.
        std::fs::write(
            store.path(),
            "Name,Enrollment_No,Current_Sem_Back,Total_Back,SPI,CPI,CGPA\nA,123456789001,0\n",
        )
        .unwrap();
        assert!(matches!(store.load_all(true), Err(AppError::Csv(_))));
        assert!(matches!(
            store.append_or_create(&record("123456789002", "B", 8.0)),
            Err(AppError::Csv(_))
        ));

        // Truncated header.
        std::fs::write(store.path(), "Name,Enrollment_No\nA,123456789001\n").unwrap();
        assert!(matches!(store.load_all(false), Err(AppError::Csv(_))));
    }

    #[test]
    fn whole_number_cells_are_written_without_a_decimal_point() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);
        let mut rec = record("123456789001", "A", 7.5);
        rec.current_sem_back = 2.0.into();
        rec.total_back = 0.0.into();
        store.append_or_create(&rec).unwrap();

        let content = std::fs::read_to_string(store.path()).unwrap();
        assert!(content.contains("A,123456789001,2,0,7.5,7.5,7.5"));
    }

    #[test]
    fn loading_from_a_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);
        assert!(store.load_all(true).unwrap().is_empty());
    }
}
