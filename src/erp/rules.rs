//! Business rule validation for ERP purchase orders
//!
//! One pass over the payload applying every rule in a fixed order. Rules
//! never short-circuit: the caller always gets the complete list of
//! violations. The same pass runs as the pipeline's submission gate and
//! inside the simulated ERP endpoint.

use super::schema::{ErpPurchaseOrder, UNKNOWN_LOCATION_NAME, UNKNOWN_VENDOR_NAME};

/// Apply all business rules; empty result means the order is accepted.
///
/// Line-level violations are reported with the 1-based position of the line
/// in the payload, not the document's own line identifier.
pub fn validate_purchase_order(order: &ErpPurchaseOrder) -> Vec<String> {
    let mut violations = Vec::new();

    if order.total_amount <= 0.0 {
        violations.push("Total amount must be greater than zero".to_string());
    }

    if order.total_lines < 1 {
        violations.push("Purchase order must contain at least one line item".to_string());
    }

    if order.line_items.len() != order.total_lines {
        violations.push(format!(
            "Line items count mismatch: expected {}, got {}",
            order.total_lines,
            order.line_items.len()
        ));
    }

    for (index, item) in order.line_items.iter().enumerate() {
        let line = index + 1;
        if item.quantity <= 0.0 {
            violations.push(format!("Line {line}: Quantity must be greater than zero"));
        }
        if item.unit_price < 0.0 {
            violations.push(format!("Line {line}: Unit price cannot be negative"));
        }
        if item.total_price < 0.0 {
            violations.push(format!("Line {line}: Total price cannot be negative"));
        }
    }

    if order.vendor.vendor_name.is_empty() || order.vendor.vendor_name == UNKNOWN_VENDOR_NAME {
        violations.push("Valid vendor information is required".to_string());
    }

    if order.ship_to.location_name.is_empty()
        || order.ship_to.location_name == UNKNOWN_LOCATION_NAME
    {
        violations.push("Valid ship-to location is required".to_string());
    }

    if order.po_number.trim().is_empty() {
        violations.push("Purchase order number is required".to_string());
    }

    violations
}
