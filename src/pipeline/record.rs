//! Execution record for one pipeline run
//!
//! The report is the pipeline's return value: callers learn the outcome by
//! inspecting it, never through an error channel. Each step carries its own
//! status and typed output so a failed run shows exactly how far it got.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::edi::Edi850Document;
use crate::erp::{ErpPurchaseOrder, ErpResponse};

/// Unique identifier for one pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(String);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(id: String) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of one pipeline step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Success,
    Failed,
}

/// The four pipeline steps, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepName {
    Parse,
    Transform,
    Validate,
    Submit,
}

impl StepName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parse => "parse",
            Self::Transform => "transform",
            Self::Validate => "validate",
            Self::Submit => "submit",
        }
    }
}

impl fmt::Display for StepName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one step with its typed output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord<T> {
    pub status: StepStatus,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> StepRecord<T> {
    pub fn succeed(&mut self, data: T) {
        self.status = StepStatus::Success;
        self.data = Some(data);
    }

    /// Success without captured output (the validate step on a clean run)
    pub fn mark_success(&mut self) {
        self.status = StepStatus::Success;
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = StepStatus::Failed;
        self.error = Some(error.into());
    }

    /// Failure that still carries output (the validate step's violations)
    pub fn fail_with(&mut self, data: T, error: impl Into<String>) {
        self.status = StepStatus::Failed;
        self.data = Some(data);
        self.error = Some(error.into());
    }

    pub fn is_pending(&self) -> bool {
        self.status == StepStatus::Pending
    }

    pub fn is_success(&self) -> bool {
        self.status == StepStatus::Success
    }
}

impl<T> Default for StepRecord<T> {
    fn default() -> Self {
        Self {
            status: StepStatus::Pending,
            data: None,
            error: None,
        }
    }
}

/// Submission step record: outcome plus the attempt counter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRecord {
    pub status: StepStatus,
    pub data: Option<ErpResponse>,
    pub error: Option<String>,
    /// Attempts made so far; 0 until the first attempt starts
    pub attempts: u32,
}

impl SubmitRecord {
    pub fn succeed(&mut self, data: ErpResponse) {
        self.status = StepStatus::Success;
        self.data = Some(data);
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = StepStatus::Failed;
        self.error = Some(error.into());
    }

    pub fn is_pending(&self) -> bool {
        self.status == StepStatus::Pending
    }

    pub fn is_success(&self) -> bool {
        self.status == StepStatus::Success
    }
}

impl Default for SubmitRecord {
    fn default() -> Self {
        Self {
            status: StepStatus::Pending,
            data: None,
            error: None,
            attempts: 0,
        }
    }
}

/// The four step records for one run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepSet {
    pub parse: StepRecord<Edi850Document>,
    pub transform: StepRecord<ErpPurchaseOrder>,
    pub validate: StepRecord<Vec<String>>,
    pub submit: SubmitRecord,
}

impl StepSet {
    /// First step still pending, scanning in pipeline order
    pub fn first_pending(&self) -> Option<StepName> {
        if self.parse.is_pending() {
            Some(StepName::Parse)
        } else if self.transform.is_pending() {
            Some(StepName::Transform)
        } else if self.validate.is_pending() {
            Some(StepName::Validate)
        } else if self.submit.is_pending() {
            Some(StepName::Submit)
        } else {
            None
        }
    }

    /// Mark the named step failed (fault attribution for unclassified errors)
    pub fn fail_step(&mut self, step: StepName, error: &str) {
        match step {
            StepName::Parse => self.parse.fail(error),
            StepName::Transform => self.transform.fail(error),
            StepName::Validate => self.validate.fail(error),
            StepName::Submit => self.submit.fail(error),
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.parse.is_success()
            && self.transform.is_success()
            && self.validate.is_success()
            && self.submit.is_success()
    }
}

/// Terminal outcome attached to a sealed report
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FinalResult {
    /// Downstream acceptance response
    Accepted(ErpResponse),
    /// Business rule rejection summary
    Rejected {
        error: String,
        validation_errors: Vec<String>,
    },
}

/// Complete, inspectable execution record for one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobReport {
    pub job_id: JobId,
    /// True only when every step succeeded
    pub success: bool,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Wall-clock duration, rounded to hundredths of a second
    pub duration_seconds: Option<f64>,
    pub steps: StepSet,
    pub final_result: Option<FinalResult>,
}

impl JobReport {
    pub fn new(job_id: JobId, started_at: DateTime<Utc>) -> Self {
        Self {
            job_id,
            success: false,
            started_at,
            completed_at: None,
            duration_seconds: None,
            steps: StepSet::default(),
            final_result: None,
        }
    }

    /// Seal the report: stamp completion, compute duration, derive success.
    ///
    /// Runs exactly once per report, as the last act of a pipeline run.
    pub fn seal(&mut self, completed_at: DateTime<Utc>) {
        let elapsed = (completed_at - self.started_at).num_milliseconds() as f64 / 1000.0;
        self.completed_at = Some(completed_at);
        self.duration_seconds = Some((elapsed * 100.0).round() / 100.0);
        self.success = self.steps.all_succeeded();
    }
}
