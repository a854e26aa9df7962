// src/sequence.rs

//! Deterministic enrollment number sequence.
//!
//! Enrollment numbers are a fixed digit prefix followed by a zero-padded
//! roll suffix that increments by one across the batch.

use crate::error::{AppError, Result};

/// Width of the varying roll suffix at the end of an enrollment number.
pub const ROLL_WIDTH: usize = 3;

/// Lazy, restartable sequence of enrollment numbers.
///
/// Produces exactly `count` keys with suffixes `start..start + count - 1`,
/// each zero-padded to the suffix width. No side effects; `Clone` restarts
/// the sequence from the beginning.
#[derive(Debug, Clone)]
pub struct EnrollmentSequence {
    prefix: String,
    pad: usize,
    next: u64,
    /// One past the last suffix
    end: u64,
}

impl EnrollmentSequence {
    /// Build a sequence from a digit prefix, a starting suffix, a count and
    /// the suffix pad width.
    pub fn new(prefix: &str, start: u64, count: u64, pad: usize) -> Result<Self> {
        if count == 0 {
            return Err(AppError::invalid_range("count must be > 0"));
        }
        if pad == 0 {
            return Err(AppError::invalid_range("suffix width must be > 0"));
        }
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_digit()) {
            return Err(AppError::invalid_range(format!(
                "prefix {:?} is not a digit string",
                prefix
            )));
        }

        let last = start
            .checked_add(count - 1)
            .ok_or_else(|| AppError::invalid_range("suffix range overflows"))?;
        if decimal_width(last) > pad {
            return Err(AppError::invalid_range(format!(
                "suffix {} does not fit in {} digits",
                last, pad
            )));
        }

        Ok(Self {
            prefix: prefix.to_string(),
            pad,
            next: start,
            end: last + 1,
        })
    }

    /// Build a sequence from a full starting key of the given total width.
    ///
    /// The trailing [`ROLL_WIDTH`] digits are the starting roll suffix; the
    /// rest is the immutable prefix.
    pub fn from_start_key(start_key: &str, count: u64, width: usize) -> Result<Self> {
        if start_key.len() != width {
            return Err(AppError::invalid_range(format!(
                "starting key {:?} is not {} characters wide",
                start_key, width
            )));
        }
        if !start_key.chars().all(|c| c.is_ascii_digit()) {
            return Err(AppError::invalid_range(format!(
                "starting key {:?} is not a digit string",
                start_key
            )));
        }
        if width <= ROLL_WIDTH {
            return Err(AppError::invalid_range(format!(
                "key width {} leaves no room for a prefix",
                width
            )));
        }

        let (prefix, roll) = start_key.split_at(width - ROLL_WIDTH);
        // The split is all digits, so this parse cannot fail.
        let start = roll.parse::<u64>().unwrap_or(0);
        Self::new(prefix, start, count, ROLL_WIDTH)
    }

    /// Total width of every produced key.
    pub fn width(&self) -> usize {
        self.prefix.len() + self.pad
    }
}

impl Iterator for EnrollmentSequence {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.next >= self.end {
            return None;
        }
        let key = format!("{}{:0pad$}", self.prefix, self.next, pad = self.pad);
        self.next += 1;
        Some(key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.end - self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for EnrollmentSequence {}

/// Number of decimal digits of `n`.
fn decimal_width(n: u64) -> usize {
    if n == 0 { 1 } else { (n.ilog10() + 1) as usize }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_exact_count_of_fixed_width_keys() {
        let seq = EnrollmentSequence::new("123456789", 1, 5, 3).unwrap();
        let keys: Vec<String> = seq.collect();
        assert_eq!(keys.len(), 5);
        assert_eq!(keys[0], "123456789001");
        assert_eq!(keys[4], "123456789005");
        assert!(keys.iter().all(|k| k.len() == 12));
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn zero_count_is_rejected() {
        let err = EnrollmentSequence::new("123456789", 1, 0, 3).unwrap_err();
        assert!(matches!(err, AppError::InvalidRange(_)));
    }

    #[test]
    fn suffix_overflow_is_rejected() {
        // 999 fits, 1000 does not
        assert!(EnrollmentSequence::new("123456789", 1, 999, 3).is_ok());
        let err = EnrollmentSequence::new("123456789", 1, 1000, 3).unwrap_err();
        assert!(matches!(err, AppError::InvalidRange(_)));
    }

    #[test]
    fn non_digit_prefix_is_rejected() {
        assert!(EnrollmentSequence::new("12AB56789", 1, 3, 3).is_err());
    }

    #[test]
    fn from_start_key_splits_prefix_and_roll() {
        let seq = EnrollmentSequence::from_start_key("123456789007", 3, 12).unwrap();
        let keys: Vec<String> = seq.collect();
        assert_eq!(keys, vec!["123456789007", "123456789008", "123456789009"]);
    }

    #[test]
    fn from_start_key_preserves_leading_zero_prefix() {
        let seq = EnrollmentSequence::from_start_key("000123456001", 2, 12).unwrap();
        let keys: Vec<String> = seq.collect();
        assert_eq!(keys, vec!["000123456001", "000123456002"]);
    }

    #[test]
    fn from_start_key_rejects_wrong_width() {
        assert!(EnrollmentSequence::from_start_key("12345", 3, 12).is_err());
    }

    #[test]
    fn clone_restarts_the_sequence() {
        let seq = EnrollmentSequence::new("123456789", 1, 3, 3).unwrap();
        let restart = seq.clone();
        assert_eq!(seq.count(), 3);
        assert_eq!(restart.count(), 3);
    }
}
