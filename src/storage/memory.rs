//! In-memory job store
//!
//! Default backend for the CLI and the test suites. Jobs live in a map
//! guarded by an async RwLock; reads are exposed for inspection even though
//! the pipeline itself only ever writes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::pipeline::record::JobId;

use super::{JobPatch, JobStore, LogEntry, NewJob, StepRow, StoreResult};

/// A job row with everything recorded against it
#[derive(Debug, Clone)]
pub struct StoredJob {
    pub job_id: JobId,
    pub started_at: DateTime<Utc>,
    pub edi_content: String,
    pub po_number: Option<String>,
    pub total_amount: Option<f64>,
    pub vendor_name: Option<String>,
    pub erp_po_id: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_seconds: Option<f64>,
    pub success: bool,
    pub steps: Vec<StepRow>,
    pub logs: Vec<LogEntry>,
}

impl StoredJob {
    fn new(job: NewJob) -> Self {
        Self {
            job_id: job.job_id,
            started_at: job.started_at,
            edi_content: job.edi_content,
            po_number: None,
            total_amount: None,
            vendor_name: None,
            erp_po_id: None,
            completed_at: None,
            duration_seconds: None,
            success: false,
            steps: Vec::new(),
            logs: Vec::new(),
        }
    }

    fn apply(&mut self, patch: JobPatch) {
        if let Some(po_number) = patch.po_number {
            self.po_number = Some(po_number);
        }
        if let Some(total_amount) = patch.total_amount {
            self.total_amount = Some(total_amount);
        }
        if let Some(vendor_name) = patch.vendor_name {
            self.vendor_name = Some(vendor_name);
        }
        if let Some(erp_po_id) = patch.erp_po_id {
            self.erp_po_id = Some(erp_po_id);
        }
        if let Some(completed_at) = patch.completed_at {
            self.completed_at = Some(completed_at);
        }
        if let Some(duration_seconds) = patch.duration_seconds {
            self.duration_seconds = Some(duration_seconds);
        }
        if let Some(success) = patch.success {
            self.success = success;
        }
    }
}

/// Map-backed store, cheap to clone and share
#[derive(Debug, Clone, Default)]
pub struct MemoryJobStore {
    jobs: Arc<RwLock<HashMap<JobId, StoredJob>>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of one job, if recorded
    pub async fn job(&self, job_id: &JobId) -> Option<StoredJob> {
        self.jobs.read().await.get(job_id).cloned()
    }

    /// Snapshot of all recorded jobs, most recent first
    pub async fn jobs(&self) -> Vec<StoredJob> {
        let mut jobs: Vec<StoredJob> = self.jobs.read().await.values().cloned().collect();
        jobs.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        jobs
    }

    pub async fn job_count(&self) -> usize {
        self.jobs.read().await.len()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn create_job(&self, job: NewJob) -> StoreResult<()> {
        let mut jobs = self.jobs.write().await;
        jobs.insert(job.job_id.clone(), StoredJob::new(job));
        Ok(())
    }

    async fn create_step(&self, step: StepRow) -> StoreResult<()> {
        let mut jobs = self.jobs.write().await;
        if let Some(job) = jobs.get_mut(&step.job_id) {
            job.steps.push(step);
        }
        Ok(())
    }

    async fn update_job(&self, job_id: &JobId, patch: JobPatch) -> StoreResult<()> {
        let mut jobs = self.jobs.write().await;
        if let Some(job) = jobs.get_mut(job_id) {
            job.apply(patch);
        }
        Ok(())
    }

    async fn append_log(&self, entry: LogEntry) -> StoreResult<()> {
        let mut jobs = self.jobs.write().await;
        if let Some(job) = jobs.get_mut(&entry.job_id) {
            job.logs.push(entry);
        }
        Ok(())
    }
}
