//! Pipeline orchestrator
//!
//! Drives parse, transform, validate and submit for one EDI 850 document,
//! retries the submission with exponential backoff, and leaves a complete
//! audit trail in the job record store. The orchestrator never returns an
//! error: every outcome, including failures, is captured in the report.

use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::PipelineConfig;
use crate::edi::DocumentParser;
use crate::erp::{ErpClient, ErpMapper, ErpPurchaseOrder, ErpResponse, SubmitError};
use crate::error::PipelineError;
use crate::pipeline::record::{FinalResult, JobId, JobReport, StepName, StepStatus};
use crate::storage::{JobPatch, JobStore, LogEntry, LogLevel, NewJob, StepRow};

pub struct Orchestrator {
    config: PipelineConfig,
    parser: DocumentParser,
    mapper: ErpMapper,
    erp: Arc<dyn ErpClient>,
    store: Arc<dyn JobStore>,
}

impl Orchestrator {
    pub fn new(config: PipelineConfig, erp: Arc<dyn ErpClient>, store: Arc<dyn JobStore>) -> Self {
        let parser = DocumentParser::new(config.delimiters);
        Self {
            config,
            parser,
            mapper: ErpMapper::new(),
            erp,
            store,
        }
    }

    /// Run the full pipeline for one raw EDI 850 payload
    pub async fn process(&self, edi_content: &str) -> JobReport {
        let job_id = JobId::new();
        let started_at = Utc::now();
        let mut report = JobReport::new(job_id.clone(), started_at);

        if self.config.logging {
            info!(job_id = %job_id, "Starting EDI integration pipeline");
        }

        self.create_job_row(&job_id, edi_content).await;
        self.audit(
            &job_id,
            LogLevel::Info,
            format!("Integration job {job_id} started"),
            None,
        )
        .await;

        if let Err(fault) = self.run_stages(edi_content, &mut report).await {
            self.record_failure(&mut report, fault).await;
        }

        self.finalize(&mut report).await;
        report
    }

    /// The strict stage sequence. Ok means the run reached a terminal
    /// outcome on its own, which includes a business rule rejection; Err is
    /// a stage fault for `record_failure` to attribute.
    async fn run_stages(
        &self,
        edi_content: &str,
        report: &mut JobReport,
    ) -> Result<(), PipelineError> {
        let job_id = report.job_id.clone();

        // Stage 1: parse.
        if self.config.logging {
            info!("Step 1: Parsing EDI 850 document");
        }
        let document = self.parser.parse(edi_content)?;
        let parse_data = serde_json::to_value(&document)
            .map_err(|e| PipelineError::Unexpected(format!("failed to encode parse output: {e}")))?;
        let po_number = document.order.purchase_order_number.clone();
        report.steps.parse.succeed(document.clone());
        if self.config.logging {
            info!(po_number = %po_number, "Parse successful");
        }
        self.write_step(&job_id, StepName::Parse, StepStatus::Success, Some(parse_data), None, None)
            .await;
        self.patch_job(
            &job_id,
            JobPatch {
                po_number: Some(po_number.clone()),
                ..Default::default()
            },
        )
        .await;
        self.audit(
            &job_id,
            LogLevel::Info,
            format!("Parse successful - PO: {po_number}"),
            None,
        )
        .await;

        // Stage 2: transform.
        if self.config.logging {
            info!("Step 2: Transforming to ERP schema");
        }
        let payload = self.mapper.transform(&document)?;
        let transform_data = serde_json::to_value(&payload).map_err(|e| {
            PipelineError::Unexpected(format!("failed to encode transform output: {e}"))
        })?;
        let total_amount = payload.total_amount;
        let vendor_name = payload.vendor.vendor_name.clone();
        report.steps.transform.succeed(payload.clone());
        if self.config.logging {
            info!(total_amount, "Transform successful");
        }
        self.write_step(
            &job_id,
            StepName::Transform,
            StepStatus::Success,
            Some(transform_data),
            None,
            None,
        )
        .await;
        self.patch_job(
            &job_id,
            JobPatch {
                total_amount: Some(total_amount),
                vendor_name: Some(vendor_name),
                ..Default::default()
            },
        )
        .await;
        self.audit(
            &job_id,
            LogLevel::Info,
            format!("Transform successful - Total: ${total_amount:.2}"),
            None,
        )
        .await;

        // Stage 3: validate. A rejection is terminal but not a fault: the
        // submit step is never reached and stays pending.
        if self.config.logging {
            info!("Step 3: Validating business rules");
        }
        let violations = crate::erp::validate_purchase_order(&payload);
        if !violations.is_empty() {
            let error_msg = format!("Business rule validation failed: {} errors", violations.len());
            if self.config.logging {
                error!("{error_msg}");
                for violation in &violations {
                    error!("  - {violation}");
                }
            }
            self.write_step(
                &job_id,
                StepName::Validate,
                StepStatus::Failed,
                Some(json!({ "errors": violations })),
                Some(error_msg.clone()),
                None,
            )
            .await;
            self.audit(
                &job_id,
                LogLevel::Error,
                error_msg.clone(),
                Some(json!({ "errors": violations })),
            )
            .await;
            report.final_result = Some(FinalResult::Rejected {
                error: error_msg.clone(),
                validation_errors: violations.clone(),
            });
            report.steps.validate.fail_with(violations, error_msg);
            return Ok(());
        }
        report.steps.validate.mark_success();
        if self.config.logging {
            info!("Validation successful");
        }
        self.write_step(&job_id, StepName::Validate, StepStatus::Success, None, None, None)
            .await;
        self.audit(&job_id, LogLevel::Info, "Validation successful".to_string(), None)
            .await;

        // Stage 4: submit with retry.
        if self.config.logging {
            info!("Step 4: Posting to ERP system");
        }
        let response = self.submit_with_retry(&payload, report).await?;
        let submit_data = serde_json::to_value(&response).map_err(|e| {
            PipelineError::Unexpected(format!("failed to encode submit output: {e}"))
        })?;
        let attempts = report.steps.submit.attempts;
        let erp_po_id = response
            .erp_po_id
            .clone()
            .unwrap_or_else(|| "UNKNOWN".to_string());
        report.steps.submit.succeed(response.clone());
        if self.config.logging {
            info!(erp_po_id = %erp_po_id, attempts, "ERP post successful");
        }
        self.write_step(
            &job_id,
            StepName::Submit,
            StepStatus::Success,
            Some(submit_data),
            None,
            Some(attempts),
        )
        .await;
        self.patch_job(
            &job_id,
            JobPatch {
                erp_po_id: Some(erp_po_id.clone()),
                ..Default::default()
            },
        )
        .await;
        self.audit(
            &job_id,
            LogLevel::Info,
            format!("ERP post successful - ERP PO ID: {erp_po_id}"),
            None,
        )
        .await;
        report.final_result = Some(FinalResult::Accepted(response));

        Ok(())
    }

    /// Submit with bounded retry. Any rejection or transport failure is
    /// retried; the record's attempt counter tracks every attempt started.
    async fn submit_with_retry(
        &self,
        payload: &ErpPurchaseOrder,
        report: &mut JobReport,
    ) -> Result<ErpResponse, PipelineError> {
        let job_id = report.job_id.clone();
        let policy = self.config.retry;
        let mut last_error: Option<SubmitError> = None;

        for attempt in 1..=policy.max_attempts {
            if let Some(delay) = policy.delay_before(attempt) {
                if self.config.logging {
                    info!(
                        delay_ms = delay.as_millis() as u64,
                        "Waiting before retry"
                    );
                }
                tokio::time::sleep(delay).await;
            }

            report.steps.submit.attempts = attempt;
            if attempt > 1 {
                if self.config.logging {
                    info!("Retry attempt {attempt}/{}", policy.max_attempts);
                }
                self.audit(
                    &job_id,
                    LogLevel::Warning,
                    format!("Retry attempt {attempt}/{}", policy.max_attempts),
                    None,
                )
                .await;
            }

            match self.erp.submit(payload).await {
                Ok(response) => return Ok(response),
                Err(err) => {
                    if self.config.logging {
                        warn!(attempt, error = %err, "Submission attempt failed");
                    }
                    last_error = Some(err);
                }
            }
        }

        let last_error = last_error
            .map(|err| err.to_string())
            .unwrap_or_else(|| "no attempts were made".to_string());
        Err(PipelineError::Submit {
            attempts: policy.max_attempts,
            last_error,
        })
    }

    /// Attribute a stage fault to the right step record and step row
    async fn record_failure(&self, report: &mut JobReport, fault: PipelineError) {
        let job_id = report.job_id.clone();
        match &fault {
            PipelineError::Parse(err) => {
                let text = err.to_string();
                if self.config.logging {
                    error!("EDI parsing error: {text}");
                }
                report.steps.parse.fail(text.clone());
                self.write_step(&job_id, StepName::Parse, StepStatus::Failed, None, Some(text), None)
                    .await;
                self.audit(&job_id, LogLevel::Error, fault.to_string(), None).await;
            }
            PipelineError::Transform(err) => {
                let text = err.to_string();
                if self.config.logging {
                    error!("Transformation error: {text}");
                }
                report.steps.transform.fail(text.clone());
                self.write_step(
                    &job_id,
                    StepName::Transform,
                    StepStatus::Failed,
                    None,
                    Some(text),
                    None,
                )
                .await;
                self.audit(&job_id, LogLevel::Error, fault.to_string(), None).await;
            }
            PipelineError::Submit { attempts, .. } => {
                let text = fault.to_string();
                if self.config.logging {
                    error!("{text}");
                }
                report.steps.submit.fail(text.clone());
                self.write_step(
                    &job_id,
                    StepName::Submit,
                    StepStatus::Failed,
                    None,
                    Some(text.clone()),
                    Some(*attempts),
                )
                .await;
                self.audit(&job_id, LogLevel::Error, text, None).await;
            }
            PipelineError::Unexpected(message) => {
                if self.config.logging {
                    error!("Unexpected error: {message}");
                }
                if let Some(step) = report.steps.first_pending() {
                    report.steps.fail_step(step, message);
                    self.write_step(
                        &job_id,
                        step,
                        StepStatus::Failed,
                        None,
                        Some(message.clone()),
                        None,
                    )
                    .await;
                }
                self.audit(&job_id, LogLevel::Error, fault.to_string(), None).await;
            }
        }
    }

    /// Seal the report and write the closing job patch. Runs exactly once
    /// per job, on every path.
    async fn finalize(&self, report: &mut JobReport) {
        let completed_at = Utc::now();
        report.seal(completed_at);
        let duration = report.duration_seconds.unwrap_or(0.0);

        if self.config.logging {
            info!(
                job_id = %report.job_id,
                duration_seconds = duration,
                success = report.success,
                "Pipeline finished"
            );
        }

        self.patch_job(
            &report.job_id,
            JobPatch {
                completed_at: Some(completed_at),
                duration_seconds: Some(duration),
                success: Some(report.success),
                ..Default::default()
            },
        )
        .await;
        self.audit(
            &report.job_id,
            LogLevel::Info,
            format!("Job completed in {duration:.2}s - Success: {}", report.success),
            None,
        )
        .await;
    }

    // Record store writes never fail the run: log and move on.

    async fn create_job_row(&self, job_id: &JobId, edi_content: &str) {
        let job = NewJob {
            job_id: job_id.clone(),
            started_at: Utc::now(),
            edi_content: edi_content.to_string(),
        };
        if let Err(err) = self.store.create_job(job).await {
            warn!(job_id = %job_id, "failed to create job record: {err}");
        }
    }

    async fn write_step(
        &self,
        job_id: &JobId,
        step: StepName,
        status: StepStatus,
        data: Option<serde_json::Value>,
        error: Option<String>,
        attempts: Option<u32>,
    ) {
        let row = StepRow {
            job_id: job_id.clone(),
            step,
            status,
            data,
            error,
            attempts,
        };
        if let Err(err) = self.store.create_step(row).await {
            warn!(job_id = %job_id, step = %step, "failed to record step: {err}");
        }
    }

    async fn patch_job(&self, job_id: &JobId, patch: JobPatch) {
        if let Err(err) = self.store.update_job(job_id, patch).await {
            warn!(job_id = %job_id, "failed to update job record: {err}");
        }
    }

    async fn audit(
        &self,
        job_id: &JobId,
        level: LogLevel,
        message: String,
        details: Option<serde_json::Value>,
    ) {
        let entry = LogEntry {
            job_id: job_id.clone(),
            timestamp: Utc::now(),
            level,
            message,
            details,
        };
        if let Err(err) = self.store.append_log(entry).await {
            warn!(job_id = %job_id, "failed to append job log: {err}");
        }
    }
}
