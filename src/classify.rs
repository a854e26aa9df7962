// src/classify.rs

//! Outcome classification.
//!
//! Pure functions over a captured page snapshot; nothing here talks to the
//! browser. The engine takes the snapshot, this module decides what it means.

use crate::models::{Outcome, ResultRecord, Score, SiteMessages};

/// Raw text captured from the result page after a submit.
#[derive(Debug, Clone, Default)]
pub struct PageSnapshot {
    /// Neither the message nor the result region appeared in the wait window
    pub timed_out: bool,

    /// Trimmed text of the site message label, when present
    pub message: Option<String>,

    /// Text of the seven result fields, when the result region rendered
    pub fields: Option<ResultFields>,
}

/// Per-field text as read from the result region. `None` means the element
/// was absent or unreadable.
#[derive(Debug, Clone, Default)]
pub struct ResultFields {
    pub name: Option<String>,
    pub enrollment: Option<String>,
    pub current_sem_back: Option<String>,
    pub total_back: Option<String>,
    pub spi: Option<String>,
    pub cpi: Option<String>,
    pub cgpa: Option<String>,
}

/// Classify a snapshot into an [`Outcome`].
///
/// Decision order: known site messages first, then the timeout flag, then a
/// full read of the result fields. Numeric fields parse leniently; only a
/// missing text field is a parse failure.
pub fn classify(snapshot: &PageSnapshot, messages: &SiteMessages) -> Outcome {
    if let Some(message) = &snapshot.message {
        let message = message.trim();
        if message.contains(&messages.no_data) {
            return Outcome::NoData;
        }
        if message.contains(&messages.bad_captcha) {
            return Outcome::BadCaptcha;
        }
    }

    if snapshot.timed_out {
        return Outcome::Timeout;
    }

    let Some(fields) = &snapshot.fields else {
        return Outcome::ParseError;
    };
    let (Some(name), Some(enrollment)) = (&fields.name, &fields.enrollment) else {
        return Outcome::ParseError;
    };
    let (Some(current), Some(total), Some(spi), Some(cpi), Some(cgpa)) = (
        &fields.current_sem_back,
        &fields.total_back,
        &fields.spi,
        &fields.cpi,
        &fields.cgpa,
    ) else {
        return Outcome::ParseError;
    };

    Outcome::Success(ResultRecord {
        name: name.trim().to_string(),
        enrollment: enrollment.trim().to_string(),
        current_sem_back: Score::parse(current),
        total_back: Score::parse(total),
        spi: Score::parse(spi),
        cpi: Score::parse(cpi),
        cgpa: Score::parse(cgpa),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages() -> SiteMessages {
        SiteMessages::default()
    }

    fn full_fields() -> ResultFields {
        ResultFields {
            name: Some("SHARMA RAHUL".to_string()),
            enrollment: Some("123456789001".to_string()),
            current_sem_back: Some("0".to_string()),
            total_back: Some("2".to_string()),
            spi: Some("7.5".to_string()),
            cpi: Some("7.1".to_string()),
            cgpa: Some("7.0".to_string()),
        }
    }

    #[test]
    fn no_data_message_wins() {
        let snapshot = PageSnapshot {
            message: Some("Oppssss! Data not available.".to_string()),
            ..PageSnapshot::default()
        };
        assert_eq!(classify(&snapshot, &messages()), Outcome::NoData);
    }

    #[test]
    fn bad_captcha_message_wins() {
        let snapshot = PageSnapshot {
            message: Some("ERROR: Incorrect captcha code, try again.".to_string()),
            ..PageSnapshot::default()
        };
        assert_eq!(classify(&snapshot, &messages()), Outcome::BadCaptcha);
    }

    #[test]
    fn known_message_beats_timeout_flag() {
        let snapshot = PageSnapshot {
            timed_out: true,
            message: Some("Oppssss! Data not available.".to_string()),
            fields: None,
        };
        assert_eq!(classify(&snapshot, &messages()), Outcome::NoData);
    }

    #[test]
    fn nothing_appeared_is_a_timeout() {
        let snapshot = PageSnapshot {
            timed_out: true,
            ..PageSnapshot::default()
        };
        assert_eq!(classify(&snapshot, &messages()), Outcome::Timeout);
    }

    #[test]
    fn missing_text_field_is_a_parse_error() {
        let mut fields = full_fields();
        fields.cgpa = None;
        let snapshot = PageSnapshot {
            fields: Some(fields),
            ..PageSnapshot::default()
        };
        assert_eq!(classify(&snapshot, &messages()), Outcome::ParseError);
    }

    #[test]
    fn full_fields_produce_a_record() {
        let snapshot = PageSnapshot {
            fields: Some(full_fields()),
            ..PageSnapshot::default()
        };
        match classify(&snapshot, &messages()) {
            Outcome::Success(record) => {
                assert_eq!(record.name, "SHARMA RAHUL");
                assert_eq!(record.enrollment, "123456789001");
                assert_eq!(record.spi.value(), Some(7.5));
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[test]
    fn non_numeric_score_is_lenient() {
        let mut fields = full_fields();
        fields.spi = Some("AB".to_string());
        let snapshot = PageSnapshot {
            fields: Some(fields),
            ..PageSnapshot::default()
        };
        match classify(&snapshot, &messages()) {
            Outcome::Success(record) => assert_eq!(record.spi.value(), None),
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[test]
    fn unknown_message_falls_through_to_fields() {
        let snapshot = PageSnapshot {
            message: Some("Server busy, come back later".to_string()),
            fields: Some(full_fields()),
            ..PageSnapshot::default()
        };
        assert!(matches!(
            classify(&snapshot, &messages()),
            Outcome::Success(_)
        ));
    }
}
