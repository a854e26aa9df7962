// src/engine.rs

//! The harvest engine.
//!
//! Drives each enrollment number through the interactive lookup protocol:
//! fill the form, hand the captcha to the operator, submit, classify what
//! came back, persist on success. Keys are processed strictly in sequence
//! order, one at a time; classification failures are logged and skipped,
//! while store, driver and cancellation errors abort the remaining keys.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::captcha::CaptchaGate;
use crate::classify::{PageSnapshot, ResultFields, classify};
use crate::driver::PageActor;
use crate::error::{AppError, Result};
use crate::models::{Config, Outcome, RunReport};
use crate::sequence::EnrollmentSequence;
use crate::store::ResultStore;
use crate::summary;

/// One harvesting session: the browser, the output table, the captcha gate
/// and the single-run guard, held together explicitly instead of as shared
/// globals.
pub struct HarvestEngine<A: PageActor, S: ResultStore> {
    config: Arc<Config>,
    actor: A,
    store: S,
    gate: CaptchaGate,
    cancel: CancellationToken,
    running: bool,
}

impl<A: PageActor, S: ResultStore> HarvestEngine<A, S> {
    /// Assemble an engine over an already-opened page actor.
    pub fn new(
        config: Arc<Config>,
        actor: A,
        store: S,
        gate: CaptchaGate,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            actor,
            store,
            gate,
            cancel,
            running: false,
        }
    }

    /// Whether a run is currently active.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Run the full harvest over the sequence, then append the summary
    /// block and return the tallies.
    ///
    /// The browser resource is released and the guard reset on both the
    /// success and the error path.
    pub async fn run(
        &mut self,
        sequence: EnrollmentSequence,
        exam_value: Option<&str>,
    ) -> Result<RunReport> {
        if self.running {
            return Err(AppError::config("a harvest run is already active"));
        }
        self.running = true;

        let result = self.run_inner(sequence, exam_value).await;

        self.running = false;
        if let Err(e) = self.actor.close().await {
            log::warn!("Failed to release the browser cleanly: {}", e);
        }

        result
    }

    async fn run_inner(
        &self,
        sequence: EnrollmentSequence,
        exam_value: Option<&str>,
    ) -> Result<RunReport> {
        let total = sequence.len();
        log::info!("Harvesting {} enrollment numbers", total);

        if let Some(value) = exam_value {
            self.actor
                .select_option(&self.config.elements.exam_select, value)
                .await?;
        }

        let mut report = RunReport::begin();
        for (index, key) in sequence.enumerate() {
            if self.cancel.is_cancelled() {
                return Err(AppError::Cancelled);
            }

            log::info!("[{}/{}] Looking up {}", index + 1, total, key);
            let outcome = self.process_record(&key).await?;
            report.tally(&outcome);
        }

        // Aggregation runs once, after the last key, over whatever was saved.
        summary::append_summary(&self.store)?;

        report.finish();
        log::info!(
            "Run complete: {} attempted, {} saved, {} skipped",
            report.attempted,
            report.saved,
            report.skipped()
        );
        Ok(report)
    }

    /// Drive one enrollment number from pending to a terminal outcome.
    ///
    /// Phases: form filled, awaiting captcha, submitted, classified, then
    /// persisted or skipped. The returned `Err` is reserved for run-fatal
    /// conditions; every per-record failure comes back as an [`Outcome`].
    async fn process_record(&self, key: &str) -> Result<Outcome> {
        let ids = &self.config.elements;

        // Idle -> FormFilled
        self.actor.fill_field(&ids.enrollment_field, key).await?;
        self.actor
            .fill_field(&ids.password_field, &self.config.portal.password)
            .await?;

        // FormFilled -> AwaitingCaptcha: park on the operator
        let image = self.actor.extract_image(&ids.captcha_image).await?;
        let answer = self.gate.solve(key, image).await?;

        // AwaitingCaptcha -> Submitted
        self.actor.fill_field(&ids.captcha_field, &answer).await?;
        self.actor.submit().await?;

        // Submitted -> Classified
        let timeout = Duration::from_secs(self.config.harvest.result_timeout_secs);
        let appeared = self
            .actor
            .wait_for_any(&[&ids.message_label, &ids.cgpa_label], timeout)
            .await?;

        let snapshot = if appeared {
            self.snapshot().await?
        } else {
            // Nothing rendered; classify as timeout without reading text
            PageSnapshot {
                timed_out: true,
                ..PageSnapshot::default()
            }
        };
        let outcome = classify(&snapshot, &self.config.messages);

        // Classified -> Persisted | Skipped
        match &outcome {
            Outcome::Success(record) => {
                self.store.append_or_create(record)?;
                log::info!("Saved result for {}", record.enrollment);
            }
            skipped => {
                log::warn!("Skipping {}: {}", key, skipped.label());
            }
        }

        Ok(outcome)
    }

    /// Capture the message label and the seven result fields as text.
    async fn snapshot(&self) -> Result<PageSnapshot> {
        let ids = &self.config.elements;

        let message = if self.actor.element_present(&ids.message_label).await? {
            self.actor.read_field(&ids.message_label).await?
        } else {
            None
        };

        let fields = ResultFields {
            name: self.actor.read_field(&ids.name_label).await?,
            enrollment: self.actor.read_field(&ids.exam_label).await?,
            current_sem_back: self.actor.read_field(&ids.current_back_label).await?,
            total_back: self.actor.read_field(&ids.total_back_label).await?,
            spi: self.actor.read_field(&ids.spi_label).await?,
            cpi: self.actor.read_field(&ids.cpi_label).await?,
            cgpa: self.actor.read_field(&ids.cgpa_label).await?,
        };

        Ok(PageSnapshot {
            timed_out: false,
            message,
            fields: Some(fields),
        })
    }
}
