//! Pipeline orchestration: execution record, retry policy, orchestrator

pub mod orchestrator;
pub mod record;
pub mod retry;

pub use orchestrator::Orchestrator;
pub use record::{
    FinalResult, JobId, JobReport, StepName, StepRecord, StepSet, StepStatus, SubmitRecord,
};
pub use retry::RetryPolicy;
