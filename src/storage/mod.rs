//! Job record persistence boundary
//!
//! The pipeline records its execution trail (job rows, per-step rows, audit
//! log lines) through this write-only interface. The pipeline never reads
//! records back, and a store failure never fails a run: callers log the
//! error and move on.

pub mod memory;

pub use memory::MemoryJobStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::pipeline::record::{JobId, StepName, StepStatus};

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure inside the record store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("record store unavailable: {0}")]
    Unavailable(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Severity for audit log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// A new job row, written once when a run begins
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewJob {
    pub job_id: JobId,
    pub started_at: DateTime<Utc>,
    /// Raw EDI payload, kept for audit
    pub edi_content: String,
}

/// One step outcome row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRow {
    pub job_id: JobId,
    pub step: StepName,
    pub status: StepStatus,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    /// Submission attempt count, when the step is submit
    pub attempts: Option<u32>,
}

/// Partial update applied to an existing job row
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobPatch {
    pub po_number: Option<String>,
    pub total_amount: Option<f64>,
    pub vendor_name: Option<String>,
    pub erp_po_id: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_seconds: Option<f64>,
    pub success: Option<bool>,
}

/// One audit log line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub job_id: JobId,
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

/// Write-only sink for pipeline execution records
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn create_job(&self, job: NewJob) -> StoreResult<()>;

    async fn create_step(&self, step: StepRow) -> StoreResult<()>;

    /// Apply the patch to an existing job; unknown ids are ignored
    async fn update_job(&self, job_id: &JobId, patch: JobPatch) -> StoreResult<()>;

    async fn append_log(&self, entry: LogEntry) -> StoreResult<()>;
}
