//! Run-level failure taxonomy for the pipeline
//!
//! A business rule rejection is deliberately absent here: rejection is a
//! normal terminal outcome recorded on the report, not an error.

use thiserror::Error;

use crate::edi::ParseError;
use crate::erp::TransformError;

/// Classified failure that ends a pipeline run at a specific stage
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The raw document could not be parsed
    #[error("EDI parsing error: {0}")]
    Parse(#[from] ParseError),

    /// The parsed document could not be mapped onto the ERP schema
    #[error("Transformation error: {0}")]
    Transform(#[from] TransformError),

    /// Every submission attempt was rejected
    #[error("All {attempts} submission attempts failed. Last error: {last_error}")]
    Submit { attempts: u32, last_error: String },

    /// A fault outside the stage taxonomy, attributed to the step that was
    /// still pending when it surfaced
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_exhaustion_message() {
        let err = PipelineError::Submit {
            attempts: 3,
            last_error: "ERP rejected purchase order (504): TIMEOUT: ERP system timeout - please retry".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "All 3 submission attempts failed. Last error: ERP rejected purchase order (504): TIMEOUT: ERP system timeout - please retry"
        );
    }

    #[test]
    fn test_parse_error_converts() {
        let parse_err = crate::edi::DocumentParser::default()
            .parse("")
            .unwrap_err();
        let err = PipelineError::from(parse_err);
        assert_eq!(
            err.to_string(),
            "EDI parsing error: ISA segment not found or incomplete"
        );
    }
}
