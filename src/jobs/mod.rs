//! Scheduled-job registry: cron-string generation and key-value persistence.
//!
//! Jobs describe recurring client operations (a saved search, an inbox
//! sweep). The registry validates a job, renders its schedule as a cron
//! expression and persists it through an explicitly passed-in
//! [`store::KeyValueStore`] capability; there is no process-wide store
//! client.

pub mod cron;
pub mod registry;
pub mod store;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, EnumString};
use thiserror::Error;

use crate::search::{OptionsError, SearchOptions};

/// What a scheduled job runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum JobType {
    Search,
    Chat,
}

/// A job as submitted by a caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    pub name: String,
    pub minute: u32,
    pub hour: u32,
    /// Weekday names ("mon", "tue", ...); unknown names are dropped, an
    /// all-invalid list is an error.
    pub days: Vec<String>,
    pub job_type: JobType,
    /// Search filters; required when `job_type` is [`JobType::Search`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<SearchOptions>,
}

/// A job as persisted in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredJob {
    pub cron_time: String,
    pub job_type: JobType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<SearchOptions>,
}

/// Failures while validating or persisting jobs.
#[derive(Error, Debug)]
pub enum JobError {
    #[error("invalid cron schedule: {0}")]
    CronSyntax(String),

    #[error("a job named '{0}' already exists")]
    Duplicate(String),

    #[error("a search job requires search options")]
    MissingSearchOptions,

    #[error("invalid search options: {0}")]
    Options(#[from] OptionsError),

    #[error(transparent)]
    Store(#[from] store::StoreError),

    #[error("stored job is not valid json: {0}")]
    Json(#[from] serde_json::Error),
}
