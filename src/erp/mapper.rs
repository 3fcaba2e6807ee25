//! Maps a parsed EDI 850 document onto the ERP purchase order payload
//!
//! Numeric fields move from string to number here. The order total is always
//! recomputed from line quantities and prices; the CTT count is carried along
//! unverified and left for the business rule validator to cross-check.

use once_cell::sync::Lazy;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use crate::edi::document::{Edi850Document, LineItem, NameAddress, ReferenceId};

use super::schema::{ErpLineItem, ErpPurchaseOrder, ErpShipTo, ErpVendor, UNKNOWN_VENDOR_ID};

/// BEG02 purchase order type codes with a descriptive label
static PO_TYPE_LABELS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("NE", "New Order"),
        ("RE", "Reorder"),
        ("SA", "Stand Alone"),
        ("CN", "Confirmation"),
        ("RL", "Release"),
    ])
});

/// REF01 qualifiers with a descriptive key for the reference map
static REFERENCE_QUALIFIERS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("DP", "department"),
        ("CO", "customer_order"),
        ("CR", "customer_reference"),
        ("PO", "previous_po"),
        ("VN", "vendor_order"),
    ])
});

/// Unit of measure applied when PO103 is empty
const DEFAULT_UNIT_OF_MEASURE: &str = "EA";

/// Raised when a captured field cannot be coerced to a number
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {field} {value:?} on line item {line}")]
pub struct TransformError {
    field: &'static str,
    value: String,
    line: String,
}

impl TransformError {
    fn invalid(field: &'static str, value: &str, line: &str) -> Self {
        Self {
            field,
            value: value.to_string(),
            line: line.to_string(),
        }
    }
}

/// Schema mapper from typed 850 documents to ERP purchase orders
#[derive(Debug, Clone, Default)]
pub struct ErpMapper;

impl ErpMapper {
    pub fn new() -> Self {
        Self
    }

    pub fn transform(&self, document: &Edi850Document) -> Result<ErpPurchaseOrder, TransformError> {
        let line_items = transform_line_items(&document.line_items)?;
        let total_amount = order_total(&line_items);

        Ok(ErpPurchaseOrder {
            po_number: document.order.purchase_order_number.clone(),
            po_date: format_edi_date(&document.order.date),
            po_type: po_type_label(&document.order.purchase_order_type),
            vendor: extract_vendor(&document.parties),
            ship_to: extract_ship_to(&document.parties),
            total_lines: line_items.len(),
            line_items,
            total_amount,
            reference_numbers: build_reference_numbers(&document.references),
        })
    }
}

/// Round to cents, half away from zero
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn transform_line_items(items: &[LineItem]) -> Result<Vec<ErpLineItem>, TransformError> {
    items.iter().map(transform_line_item).collect()
}

fn transform_line_item(item: &LineItem) -> Result<ErpLineItem, TransformError> {
    let line_number: u32 = item
        .line_number
        .parse()
        .map_err(|_| TransformError::invalid("line number", &item.line_number, &item.line_number))?;
    let quantity: f64 = item
        .quantity
        .parse()
        .map_err(|_| TransformError::invalid("quantity", &item.quantity, &item.line_number))?;
    let unit_price: f64 = item
        .unit_price
        .parse()
        .map_err(|_| TransformError::invalid("unit price", &item.unit_price, &item.line_number))?;

    let unit_of_measure = if item.unit_of_measure.is_empty() {
        DEFAULT_UNIT_OF_MEASURE.to_string()
    } else {
        item.unit_of_measure.clone()
    };

    Ok(ErpLineItem {
        line_number,
        sku: item.product_id.clone(),
        description: item.description.clone(),
        quantity,
        unit_price,
        unit_of_measure,
        total_price: round_cents(quantity * unit_price),
    })
}

fn order_total(items: &[ErpLineItem]) -> f64 {
    round_cents(items.iter().map(|item| item.total_price).sum())
}

fn po_type_label(code: &str) -> String {
    PO_TYPE_LABELS
        .get(code)
        .map(|label| (*label).to_string())
        .unwrap_or_else(|| code.to_string())
}

/// YYYYMMDD to YYYY-MM-DD; anything else passes through untouched
fn format_edi_date(date: &str) -> String {
    if date.len() == 8 && date.is_ascii() {
        format!("{}-{}-{}", &date[0..4], &date[4..6], &date[6..8])
    } else {
        date.to_string()
    }
}

fn extract_vendor(parties: &[NameAddress]) -> ErpVendor {
    match parties.iter().find(|party| party.entity_code == "VN") {
        Some(party) => ErpVendor {
            vendor_id: party
                .id_code
                .clone()
                .unwrap_or_else(|| UNKNOWN_VENDOR_ID.to_string()),
            vendor_name: party.name.clone(),
        },
        None => ErpVendor::unknown(),
    }
}

fn extract_ship_to(parties: &[NameAddress]) -> ErpShipTo {
    match parties.iter().find(|party| party.entity_code == "ST") {
        Some(party) => ErpShipTo {
            location_id: party.id_code.clone(),
            location_name: party.name.clone(),
        },
        None => ErpShipTo::unknown(),
    }
}

fn build_reference_numbers(references: &[ReferenceId]) -> Option<BTreeMap<String, String>> {
    if references.is_empty() {
        return None;
    }
    let mut numbers = BTreeMap::new();
    for reference in references {
        let key = REFERENCE_QUALIFIERS
            .get(reference.qualifier.as_str())
            .map(|name| (*name).to_string())
            .unwrap_or_else(|| reference.qualifier.to_lowercase());
        // Duplicate qualifiers: the last occurrence wins.
        numbers.insert(key, reference.value.clone());
    }
    Some(numbers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edi::DocumentParser;
    use crate::erp::schema::{UNKNOWN_LOCATION_NAME, UNKNOWN_VENDOR_NAME};

    const SAMPLE_850: &str = include_str!("../../demos/sample_850.edi");

    fn sample_document() -> Edi850Document {
        DocumentParser::default().parse(SAMPLE_850).unwrap()
    }

    fn line(number: &str, quantity: &str, uom: &str, price: &str) -> LineItem {
        LineItem {
            line_number: number.to_string(),
            quantity: quantity.to_string(),
            unit_of_measure: uom.to_string(),
            unit_price: price.to_string(),
            product_id_qualifier: "VP".to_string(),
            product_id: format!("SKU-{number}"),
            description: None,
        }
    }

    #[test]
    fn test_maps_complete_sample() {
        let payload = ErpMapper::new().transform(&sample_document()).unwrap();

        assert_eq!(payload.po_number, "PO-2024-001");
        assert_eq!(payload.po_date, "2024-01-15");
        assert_eq!(payload.po_type, "New Order");
        assert_eq!(payload.vendor.vendor_id, "VEND-100");
        assert_eq!(payload.vendor.vendor_name, "Widget Supply Co");
        assert_eq!(payload.ship_to.location_id.as_deref(), Some("DC-04"));
        assert_eq!(payload.ship_to.location_name, "Acme Distribution Center");
        assert_eq!(payload.total_lines, 3);
        assert_eq!(payload.line_items.len(), 3);
        assert_eq!(payload.total_amount, 247.40);
    }

    #[test]
    fn test_line_totals_rounded_to_cents() {
        let mut document = sample_document();
        document.line_items = vec![line("1", "3", "EA", "0.115")];
        let payload = ErpMapper::new().transform(&document).unwrap();

        // 3 x 0.115 = 0.345, rounds half away from zero to 0.35
        assert_eq!(payload.line_items[0].total_price, 0.35);
        assert_eq!(payload.total_amount, 0.35);
    }

    #[test]
    fn test_total_recomputed_not_trusted() {
        let mut document = sample_document();
        document.totals.line_item_count = "99".to_string();
        let payload = ErpMapper::new().transform(&document).unwrap();
        assert_eq!(payload.total_lines, 3);
        assert_eq!(payload.total_amount, 247.40);
    }

    #[test]
    fn test_non_numeric_quantity_fails() {
        let mut document = sample_document();
        document.line_items = vec![line("1", "abc", "EA", "1.00")];
        let err = ErpMapper::new().transform(&document).unwrap_err();
        assert!(err.to_string().contains("quantity"));
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn test_non_numeric_price_fails() {
        let mut document = sample_document();
        document.line_items = vec![line("2", "1", "EA", "$9.99")];
        let err = ErpMapper::new().transform(&document).unwrap_err();
        assert!(err.to_string().contains("unit price"));
        assert!(err.to_string().contains("line item 2"));
    }

    #[test]
    fn test_empty_unit_of_measure_defaults() {
        let mut document = sample_document();
        document.line_items = vec![line("1", "2", "", "5.00")];
        let payload = ErpMapper::new().transform(&document).unwrap();
        assert_eq!(payload.line_items[0].unit_of_measure, "EA");
    }

    #[test]
    fn test_unknown_po_type_passes_through() {
        let mut document = sample_document();
        document.order.purchase_order_type = "ZZ".to_string();
        let payload = ErpMapper::new().transform(&document).unwrap();
        assert_eq!(payload.po_type, "ZZ");
    }

    #[test]
    fn test_known_po_types() {
        for (code, label) in [
            ("NE", "New Order"),
            ("RE", "Reorder"),
            ("SA", "Stand Alone"),
            ("CN", "Confirmation"),
            ("RL", "Release"),
        ] {
            assert_eq!(po_type_label(code), label);
        }
    }

    #[test]
    fn test_date_reformat() {
        assert_eq!(format_edi_date("20240115"), "2024-01-15");
        assert_eq!(format_edi_date("240115"), "240115");
        assert_eq!(format_edi_date(""), "");
        assert_eq!(format_edi_date("2024-01-15"), "2024-01-15");
    }

    #[test]
    fn test_missing_vendor_gets_sentinel() {
        let mut document = sample_document();
        document.parties.retain(|party| party.entity_code != "VN");
        let payload = ErpMapper::new().transform(&document).unwrap();
        assert_eq!(payload.vendor.vendor_id, "UNKNOWN");
        assert_eq!(payload.vendor.vendor_name, UNKNOWN_VENDOR_NAME);
    }

    #[test]
    fn test_vendor_without_id_code() {
        let mut document = sample_document();
        for party in &mut document.parties {
            if party.entity_code == "VN" {
                party.id_code = None;
            }
        }
        let payload = ErpMapper::new().transform(&document).unwrap();
        assert_eq!(payload.vendor.vendor_id, "UNKNOWN");
        assert_eq!(payload.vendor.vendor_name, "Widget Supply Co");
    }

    #[test]
    fn test_missing_ship_to_gets_sentinel() {
        let mut document = sample_document();
        document.parties.retain(|party| party.entity_code != "ST");
        let payload = ErpMapper::new().transform(&document).unwrap();
        assert_eq!(payload.ship_to.location_id, None);
        assert_eq!(payload.ship_to.location_name, UNKNOWN_LOCATION_NAME);
    }

    #[test]
    fn test_first_matching_party_wins() {
        let mut document = sample_document();
        document.parties.push(NameAddress {
            entity_code: "VN".to_string(),
            name: "Second Vendor".to_string(),
            id_qualifier: None,
            id_code: Some("VEND-200".to_string()),
        });
        let payload = ErpMapper::new().transform(&document).unwrap();
        assert_eq!(payload.vendor.vendor_id, "VEND-100");
    }

    #[test]
    fn test_reference_qualifier_names() {
        let payload = ErpMapper::new().transform(&sample_document()).unwrap();
        let references = payload.reference_numbers.unwrap();
        assert_eq!(references.get("department"), Some(&"054".to_string()));
        assert_eq!(
            references.get("customer_order"),
            Some(&"CUST-88421".to_string())
        );
    }

    #[test]
    fn test_unknown_qualifier_lowercased() {
        let mut document = sample_document();
        document.references = vec![ReferenceId {
            qualifier: "ZZ".to_string(),
            value: "misc".to_string(),
        }];
        let payload = ErpMapper::new().transform(&document).unwrap();
        let references = payload.reference_numbers.unwrap();
        assert_eq!(references.get("zz"), Some(&"misc".to_string()));
    }

    #[test]
    fn test_duplicate_qualifier_last_wins() {
        let mut document = sample_document();
        document.references = vec![
            ReferenceId {
                qualifier: "DP".to_string(),
                value: "first".to_string(),
            },
            ReferenceId {
                qualifier: "DP".to_string(),
                value: "second".to_string(),
            },
        ];
        let payload = ErpMapper::new().transform(&document).unwrap();
        let references = payload.reference_numbers.unwrap();
        assert_eq!(references.len(), 1);
        assert_eq!(references.get("department"), Some(&"second".to_string()));
    }

    #[test]
    fn test_no_references_maps_to_none() {
        let mut document = sample_document();
        document.references.clear();
        let payload = ErpMapper::new().transform(&document).unwrap();
        assert_eq!(payload.reference_numbers, None);
    }

    #[test]
    fn test_zero_line_items_produce_zero_totals() {
        let mut document = sample_document();
        document.line_items.clear();
        let payload = ErpMapper::new().transform(&document).unwrap();
        assert_eq!(payload.total_lines, 0);
        assert_eq!(payload.total_amount, 0.0);
        assert!(payload.line_items.is_empty());
    }

    #[test]
    fn test_transform_is_deterministic() {
        let document = sample_document();
        let mapper = ErpMapper::new();
        assert_eq!(
            mapper.transform(&document).unwrap(),
            mapper.transform(&document).unwrap()
        );
    }
}
