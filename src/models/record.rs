//! Result record and lenient score types.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Placeholder stored in the enrollment column of summary rows.
pub const SUMMARY_ENROLLMENT: &str = " - ";

/// Names of the synthetic summary rows, in append order.
pub const SUMMARY_LABELS: [&str; 4] = ["MAX", "MIN", "AVG", "Total Failed Students"];

/// A numeric cell parsed leniently from page text.
///
/// The portal renders scores as free text; anything that does not parse as a
/// number is kept as a missing value rather than failing the record.
/// Aggregation treats missing as excluded, never as zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Score(pub Option<f64>);

impl Score {
    /// Parse page text into a score. Unparseable text becomes a missing value.
    pub fn parse(text: &str) -> Self {
        Score(text.trim().parse::<f64>().ok())
    }

    /// The missing-value sentinel.
    pub fn missing() -> Self {
        Score(None)
    }

    /// Inner value, if the cell held a number.
    pub fn value(&self) -> Option<f64> {
        self.0
    }
}

impl From<f64> for Score {
    fn from(v: f64) -> Self {
        Score(Some(v))
    }
}

impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            // Backlog counts and hard-zeroed summary columns stay
            // integer-formatted in the sheet.
            Some(v) if v.fract() == 0.0 => serializer.serialize_i64(v as i64),
            Some(v) => serializer.serialize_f64(v),
            None => serializer.serialize_str(""),
        }
    }
}

impl<'de> Deserialize<'de> for Score {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Score::parse(&raw))
    }
}

/// One row of the result table.
///
/// The enrollment number is always handled as text so that leading zeros and
/// site formatting survive every load/save cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Student name, or a summary label for synthetic rows
    #[serde(rename = "Name")]
    pub name: String,

    /// Enrollment number as shown by the site (may differ from the query key)
    #[serde(rename = "Enrollment_No")]
    pub enrollment: String,

    /// Backlog count for the current term
    #[serde(rename = "Current_Sem_Back")]
    pub current_sem_back: Score,

    /// Backlog count across all terms
    #[serde(rename = "Total_Back")]
    pub total_back: Score,

    #[serde(rename = "SPI")]
    pub spi: Score,

    #[serde(rename = "CPI")]
    pub cpi: Score,

    #[serde(rename = "CGPA")]
    pub cgpa: Score,
}

impl ResultRecord {
    /// True for the synthetic MAX/MIN/AVG/failed-count rows.
    pub fn is_summary(&self) -> bool {
        self.enrollment == SUMMARY_ENROLLMENT
    }
}
