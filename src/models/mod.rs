// src/models/mod.rs

//! Domain models for the harvester application.

mod config;
mod outcome;
mod record;

// Re-export all public types
pub use config::{Config, ElementIds, HarvestConfig, PortalConfig, SiteMessages};
pub use outcome::{Outcome, RunReport};
pub use record::{ResultRecord, SUMMARY_ENROLLMENT, SUMMARY_LABELS, Score};
