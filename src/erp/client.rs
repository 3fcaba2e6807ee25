//! Downstream ERP submission contract and HTTP client
//!
//! A client performs exactly one submission attempt per call; retry policy
//! lives in the pipeline, not here.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use super::schema::ErpPurchaseOrder;
use super::utc_timestamp;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Acceptance response from the ERP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErpResponse {
    pub success: bool,
    pub transaction_id: String,
    pub message: String,
    pub erp_po_id: Option<String>,
    pub timestamp: String,
    pub details: Option<serde_json::Value>,
}

/// Structured rejection body from the ERP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErpApiError {
    pub success: bool,
    pub transaction_id: String,
    pub error_code: String,
    pub error_message: String,
    pub timestamp: String,
    pub details: Option<serde_json::Value>,
}

/// Rejection bodies arrive either bare or wrapped in a detail envelope
#[derive(Deserialize)]
struct ErrorEnvelope {
    detail: ErpApiError,
}

/// A single submission attempt failure
#[derive(Error, Debug)]
pub enum SubmitError {
    /// The ERP answered with a structured rejection
    #[error("ERP rejected purchase order ({status}): {}: {}", .error.error_code, .error.error_message)]
    Rejected { status: u16, error: ErpApiError },
    /// The request never produced a usable response
    #[error("ERP transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// One-attempt submission endpoint for purchase orders
#[async_trait]
pub trait ErpClient: Send + Sync {
    async fn submit(&self, order: &ErpPurchaseOrder) -> Result<ErpResponse, SubmitError>;
}

/// HTTP client for a real ERP endpoint
pub struct HttpErpClient {
    client: Client,
    base_url: String,
}

impl HttpErpClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, SubmitError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl ErpClient for HttpErpClient {
    async fn submit(&self, order: &ErpPurchaseOrder) -> Result<ErpResponse, SubmitError> {
        let url = format!(
            "{}/purchase-orders",
            self.base_url.trim_end_matches('/')
        );
        let response = self.client.post(&url).json(order).send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(SubmitError::Rejected {
                status: status.as_u16(),
                error: parse_rejection_body(status, &body),
            })
        }
    }
}

fn parse_rejection_body(status: StatusCode, body: &str) -> ErpApiError {
    if let Ok(error) = serde_json::from_str::<ErpApiError>(body) {
        return error;
    }
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        return envelope.detail;
    }
    ErpApiError {
        success: false,
        transaction_id: String::new(),
        error_code: format!("HTTP_{}", status.as_u16()),
        error_message: if body.is_empty() {
            status.to_string()
        } else {
            body.to_string()
        },
        timestamp: utc_timestamp(),
        details: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(code: &str, message: &str) -> ErpApiError {
        ErpApiError {
            success: false,
            transaction_id: "txn-1".to_string(),
            error_code: code.to_string(),
            error_message: message.to_string(),
            timestamp: "2024-01-15T12:00:00Z".to_string(),
            details: None,
        }
    }

    #[test]
    fn test_rejection_display_names_code_and_message() {
        let err = SubmitError::Rejected {
            status: 409,
            error: api_error("DUPLICATE_PO", "Purchase order PO-1 already exists"),
        };
        assert_eq!(
            err.to_string(),
            "ERP rejected purchase order (409): DUPLICATE_PO: Purchase order PO-1 already exists"
        );
    }

    #[test]
    fn test_parse_bare_rejection_body() {
        let body = serde_json::to_string(&api_error("TIMEOUT", "try later")).unwrap();
        let parsed = parse_rejection_body(StatusCode::GATEWAY_TIMEOUT, &body);
        assert_eq!(parsed.error_code, "TIMEOUT");
    }

    #[test]
    fn test_parse_enveloped_rejection_body() {
        let body = serde_json::json!({
            "detail": api_error("VALIDATION_ERROR", "bad payload")
        })
        .to_string();
        let parsed = parse_rejection_body(StatusCode::BAD_REQUEST, &body);
        assert_eq!(parsed.error_code, "VALIDATION_ERROR");
        assert_eq!(parsed.error_message, "bad payload");
    }

    #[test]
    fn test_unparseable_body_synthesizes_error() {
        let parsed = parse_rejection_body(StatusCode::BAD_GATEWAY, "<html>oops</html>");
        assert_eq!(parsed.error_code, "HTTP_502");
        assert_eq!(parsed.error_message, "<html>oops</html>");
        assert!(!parsed.success);
    }

    #[test]
    fn test_empty_body_uses_status_line() {
        let parsed = parse_rejection_body(StatusCode::SERVICE_UNAVAILABLE, "");
        assert_eq!(parsed.error_code, "HTTP_503");
        assert_eq!(parsed.error_message, "503 Service Unavailable");
    }
}
