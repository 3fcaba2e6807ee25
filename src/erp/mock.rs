//! In-process simulated ERP endpoint
//!
//! Stands in for the downstream system in tests and local runs. It applies
//! the same business rules the real endpoint would, and can be scripted to
//! reject: either pinned to one failure scenario forever, or failing only
//! the first N attempts to exercise retry behavior.

use async_trait::async_trait;
use rand::Rng;
use serde_json::json;
use std::sync::atomic::{AtomicU32, Ordering};
use uuid::Uuid;

use super::client::{ErpApiError, ErpClient, ErpResponse, SubmitError};
use super::rules::validate_purchase_order;
use super::schema::ErpPurchaseOrder;
use super::utc_timestamp;

/// Failure scenario the simulated ERP can be scripted with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorScenario {
    /// 400: the payload failed format validation
    Validation,
    /// 409: the PO number already exists downstream
    Duplicate,
    /// 422: one or more items are out of stock
    Inventory,
    /// 504: the ERP backend timed out
    Timeout,
}

impl ErrorScenario {
    pub fn status(&self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::Duplicate => 409,
            Self::Inventory => 422,
            Self::Timeout => 504,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::Duplicate => "DUPLICATE_PO",
            Self::Inventory => "INVENTORY_UNAVAILABLE",
            Self::Timeout => "TIMEOUT",
        }
    }

    fn rejection(&self, order: &ErpPurchaseOrder, transaction_id: String) -> SubmitError {
        let (error_message, details) = match self {
            Self::Validation => (
                "Invalid purchase order format".to_string(),
                json!({"field": "line_items", "issue": "Missing required SKU"}),
            ),
            Self::Duplicate => (
                format!("Purchase order {} already exists in ERP system", order.po_number),
                json!({"existing_erp_po_id": format!("ERP-{}-5678", order.po_number)}),
            ),
            Self::Inventory => {
                let sku = order
                    .line_items
                    .first()
                    .map(|item| item.sku.clone())
                    .unwrap_or_else(|| "UNKNOWN".to_string());
                (
                    "One or more items are out of stock".to_string(),
                    json!({"unavailable_items": [{"sku": sku, "available_quantity": 0}]}),
                )
            }
            Self::Timeout => (
                "ERP system timeout - please retry".to_string(),
                json!({"retry_after": "30 seconds"}),
            ),
        };

        SubmitError::Rejected {
            status: self.status(),
            error: ErpApiError {
                success: false,
                transaction_id,
                error_code: self.error_code().to_string(),
                error_message,
                timestamp: utc_timestamp(),
                details: Some(details),
            },
        }
    }
}

/// Simulated downstream ERP
///
/// `fail_first` of zero with a scenario set means every attempt fails.
pub struct MockErp {
    scenario: Option<ErrorScenario>,
    fail_first: u32,
    attempts: AtomicU32,
}

impl MockErp {
    /// Accepts any order that passes business rules
    pub fn new() -> Self {
        Self {
            scenario: None,
            fail_first: 0,
            attempts: AtomicU32::new(0),
        }
    }

    /// Rejects every attempt with the given scenario
    pub fn with_scenario(scenario: ErrorScenario) -> Self {
        Self {
            scenario: Some(scenario),
            fail_first: 0,
            attempts: AtomicU32::new(0),
        }
    }

    /// Rejects the first `attempts` submissions, then behaves normally
    pub fn failing_first(attempts: u32, scenario: ErrorScenario) -> Self {
        Self {
            scenario: Some(scenario),
            fail_first: attempts,
            attempts: AtomicU32::new(0),
        }
    }

    /// Number of submission attempts observed so far
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Default for MockErp {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ErpClient for MockErp {
    async fn submit(&self, order: &ErpPurchaseOrder) -> Result<ErpResponse, SubmitError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        let transaction_id = Uuid::new_v4().to_string();

        if let Some(scenario) = self.scenario {
            if self.fail_first == 0 || attempt <= self.fail_first {
                return Err(scenario.rejection(order, transaction_id));
            }
        }

        let violations = validate_purchase_order(order);
        if !violations.is_empty() {
            return Err(SubmitError::Rejected {
                status: 400,
                error: ErpApiError {
                    success: false,
                    transaction_id,
                    error_code: "VALIDATION_ERROR".to_string(),
                    error_message: "Business rule validation failed".to_string(),
                    timestamp: utc_timestamp(),
                    details: Some(json!({"errors": violations})),
                },
            });
        }

        let erp_po_id = format!(
            "ERP-{}-{}",
            order.po_number,
            rand::rng().random_range(1000..=9999)
        );

        Ok(ErpResponse {
            success: true,
            transaction_id,
            message: "Purchase order created successfully".to_string(),
            erp_po_id: Some(erp_po_id),
            timestamp: utc_timestamp(),
            details: Some(json!({
                "po_number": order.po_number,
                "vendor": order.vendor.vendor_name,
                "total_amount": order.total_amount,
                "line_items_count": order.total_lines,
                "status": "PENDING_APPROVAL",
                "estimated_processing_time": "2-4 hours",
            })),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::erp::schema::{ErpLineItem, ErpShipTo, ErpVendor};

    fn order() -> ErpPurchaseOrder {
        ErpPurchaseOrder {
            po_number: "PO-7".to_string(),
            po_date: "2024-02-01".to_string(),
            po_type: "New Order".to_string(),
            vendor: ErpVendor {
                vendor_id: "VEND-9".to_string(),
                vendor_name: "Supplier Inc".to_string(),
            },
            ship_to: ErpShipTo {
                location_id: None,
                location_name: "Dock 4".to_string(),
            },
            line_items: vec![ErpLineItem {
                line_number: 1,
                sku: "SKU-1".to_string(),
                description: None,
                quantity: 4.0,
                unit_price: 2.50,
                unit_of_measure: "EA".to_string(),
                total_price: 10.0,
            }],
            total_amount: 10.0,
            total_lines: 1,
            reference_numbers: None,
        }
    }

    #[tokio::test]
    async fn test_accepts_valid_order() {
        let erp = MockErp::new();
        let response = erp.submit(&order()).await.unwrap();

        assert!(response.success);
        assert_eq!(response.message, "Purchase order created successfully");
        let erp_po_id = response.erp_po_id.unwrap();
        assert!(erp_po_id.starts_with("ERP-PO-7-"));
        let details = response.details.unwrap();
        assert_eq!(details["status"], "PENDING_APPROVAL");
        assert_eq!(details["estimated_processing_time"], "2-4 hours");
        assert_eq!(erp.attempts(), 1);
    }

    #[tokio::test]
    async fn test_rejects_rule_violations() {
        let mut bad = order();
        bad.po_number = String::new();
        let erp = MockErp::new();

        let err = erp.submit(&bad).await.unwrap_err();
        match err {
            SubmitError::Rejected { status, error } => {
                assert_eq!(status, 400);
                assert_eq!(error.error_code, "VALIDATION_ERROR");
                let errors = &error.details.unwrap()["errors"];
                assert_eq!(errors[0], "Purchase order number is required");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_pinned_scenario_always_fails() {
        let erp = MockErp::with_scenario(ErrorScenario::Duplicate);
        for _ in 0..3 {
            let err = erp.submit(&order()).await.unwrap_err();
            match err {
                SubmitError::Rejected { status, error } => {
                    assert_eq!(status, 409);
                    assert_eq!(error.error_code, "DUPLICATE_PO");
                    assert!(error.error_message.contains("PO-7"));
                }
                other => panic!("expected rejection, got {other:?}"),
            }
        }
        assert_eq!(erp.attempts(), 3);
    }

    #[tokio::test]
    async fn test_fails_first_n_then_accepts() {
        let erp = MockErp::failing_first(2, ErrorScenario::Timeout);

        assert!(erp.submit(&order()).await.is_err());
        assert!(erp.submit(&order()).await.is_err());
        let response = erp.submit(&order()).await.unwrap();
        assert!(response.success);
        assert_eq!(erp.attempts(), 3);
    }

    #[tokio::test]
    async fn test_inventory_scenario_names_first_sku() {
        let erp = MockErp::with_scenario(ErrorScenario::Inventory);
        let err = erp.submit(&order()).await.unwrap_err();
        match err {
            SubmitError::Rejected { status, error } => {
                assert_eq!(status, 422);
                let details = error.details.unwrap();
                assert_eq!(details["unavailable_items"][0]["sku"], "SKU-1");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_scenario_status_codes() {
        assert_eq!(ErrorScenario::Validation.status(), 400);
        assert_eq!(ErrorScenario::Duplicate.status(), 409);
        assert_eq!(ErrorScenario::Inventory.status(), 422);
        assert_eq!(ErrorScenario::Timeout.status(), 504);
    }
}
