//! Per-record outcomes and the end-of-run report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ResultRecord;

/// Classification of one lookup attempt. Exactly one is produced per key;
/// nothing is retried automatically within a run.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// All result fields were read; the record is ready to persist
    Success(ResultRecord),
    /// The site reported no data for this enrollment
    NoData,
    /// The site rejected the captcha answer
    BadCaptcha,
    /// Neither the result fields nor the message appeared in time
    Timeout,
    /// The result region appeared but a required field was absent
    ParseError,
}

impl Outcome {
    /// Short label for log lines and tallies.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Success(_) => "success",
            Outcome::NoData => "no data",
            Outcome::BadCaptcha => "bad captcha",
            Outcome::Timeout => "timeout",
            Outcome::ParseError => "parse error",
        }
    }
}

/// Tallies for one harvest run, written as JSON beside the output file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub attempted: usize,
    pub saved: usize,
    pub no_data: usize,
    pub bad_captcha: usize,
    pub timed_out: usize,
    pub parse_errors: usize,
}

impl RunReport {
    /// Start a report at the current instant with zeroed tallies.
    pub fn begin() -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            attempted: 0,
            saved: 0,
            no_data: 0,
            bad_captcha: 0,
            timed_out: 0,
            parse_errors: 0,
        }
    }

    /// Count one classified outcome.
    pub fn tally(&mut self, outcome: &Outcome) {
        self.attempted += 1;
        match outcome {
            Outcome::Success(_) => self.saved += 1,
            Outcome::NoData => self.no_data += 1,
            Outcome::BadCaptcha => self.bad_captcha += 1,
            Outcome::Timeout => self.timed_out += 1,
            Outcome::ParseError => self.parse_errors += 1,
        }
    }

    /// Number of records that did not end in a saved row.
    pub fn skipped(&self) -> usize {
        self.attempted - self.saved
    }

    /// Mark the run as finished now.
    pub fn finish(&mut self) {
        self.finished_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tally_tracks_each_outcome_kind() {
        let mut report = RunReport::begin();
        report.tally(&Outcome::NoData);
        report.tally(&Outcome::Timeout);
        report.tally(&Outcome::BadCaptcha);
        report.tally(&Outcome::ParseError);
        assert_eq!(report.attempted, 4);
        assert_eq!(report.saved, 0);
        assert_eq!(report.skipped(), 4);
    }
}
