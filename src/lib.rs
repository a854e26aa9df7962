// src/lib.rs

//! GTU Result Harvester Library

pub mod captcha;
pub mod classify;
pub mod driver;
pub mod engine;
pub mod error;
pub mod models;
pub mod sequence;
pub mod store;
pub mod summary;
