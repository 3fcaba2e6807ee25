//! ERP purchase order payload
//!
//! This is the downstream wire contract: field names here are what the ERP
//! endpoint receives as JSON and must not drift.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Vendor id used when the vendor loop carries no identification code
pub const UNKNOWN_VENDOR_ID: &str = "UNKNOWN";
/// Vendor name used when the document has no vendor loop at all
pub const UNKNOWN_VENDOR_NAME: &str = "Unknown Vendor";
/// Ship-to name used when the document has no ship-to loop at all
pub const UNKNOWN_LOCATION_NAME: &str = "Unknown Location";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErpVendor {
    pub vendor_id: String,
    pub vendor_name: String,
}

impl ErpVendor {
    /// Sentinel vendor for documents without a vendor loop
    pub fn unknown() -> Self {
        Self {
            vendor_id: UNKNOWN_VENDOR_ID.to_string(),
            vendor_name: UNKNOWN_VENDOR_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErpShipTo {
    pub location_id: Option<String>,
    pub location_name: String,
}

impl ErpShipTo {
    /// Sentinel location for documents without a ship-to loop
    pub fn unknown() -> Self {
        Self {
            location_id: None,
            location_name: UNKNOWN_LOCATION_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErpLineItem {
    pub line_number: u32,
    pub sku: String,
    pub description: Option<String>,
    pub quantity: f64,
    pub unit_price: f64,
    pub unit_of_measure: String,
    /// quantity x unit price, rounded to cents
    pub total_price: f64,
}

/// Complete purchase order as submitted to the ERP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErpPurchaseOrder {
    pub po_number: String,
    /// ISO date (YYYY-MM-DD) when the source date was 8 digits
    pub po_date: String,
    pub po_type: String,
    pub vendor: ErpVendor,
    pub ship_to: ErpShipTo,
    pub line_items: Vec<ErpLineItem>,
    /// Sum of line totals, rounded to cents
    pub total_amount: f64,
    pub total_lines: usize,
    /// Reference numbers keyed by descriptive qualifier name; None when the
    /// document carried no references
    pub reference_numbers: Option<BTreeMap<String, String>>,
}
