//! Typed representation of a parsed EDI 850 purchase order
//!
//! Field values stay as the trimmed strings captured from the interchange;
//! numeric coercion happens later, when the document is mapped onto the ERP
//! schema.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// ISA interchange control header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterchangeHeader {
    /// ISA02 authorization information
    pub authorization_info: String,
    /// ISA04 security information
    pub security_info: String,
    /// ISA06 interchange sender ID
    pub sender_id: String,
    /// ISA08 interchange receiver ID
    pub receiver_id: String,
    /// ISA09 interchange date (YYMMDD)
    pub date: String,
    /// ISA10 interchange time (HHMM)
    pub time: String,
    /// ISA13 interchange control number
    pub control_number: String,
    /// ISA14 acknowledgment requested flag
    pub acknowledgment_requested: String,
    /// ISA15 usage indicator (P production, T test)
    pub usage_indicator: String,
}

/// GS functional group header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupHeader {
    /// GS01 functional identifier code (PO for purchase orders)
    pub functional_id_code: String,
    /// GS02 application sender code
    pub sender_code: String,
    /// GS03 application receiver code
    pub receiver_code: String,
    /// GS04 group date (CCYYMMDD)
    pub date: String,
    /// GS05 group time
    pub time: String,
    /// GS06 group control number
    pub control_number: String,
    /// GS07 responsible agency code
    pub responsible_agency: String,
    /// GS08 version/release identifier
    pub version: String,
}

/// BEG beginning segment for the purchase order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderHeader {
    /// BEG01 transaction set purpose code
    pub transaction_set_purpose: String,
    /// BEG02 purchase order type code
    pub purchase_order_type: String,
    /// BEG03 purchase order number
    pub purchase_order_number: String,
    /// BEG05 purchase order date (CCYYMMDD)
    pub date: String,
}

/// REF reference identification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceId {
    /// REF01 reference identification qualifier
    pub qualifier: String,
    /// REF02 reference value
    pub value: String,
}

/// N1 party identification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameAddress {
    /// N101 entity identifier code (BY buyer, ST ship to, VN vendor, ...)
    pub entity_code: String,
    /// N102 party name
    pub name: String,
    /// N103 identification code qualifier, when sent
    pub id_qualifier: Option<String>,
    /// N104 identification code, when sent
    pub id_code: Option<String>,
}

/// PO1 baseline item data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// PO101 assigned line identifier
    pub line_number: String,
    /// PO102 quantity ordered
    pub quantity: String,
    /// PO103 unit of measure code
    pub unit_of_measure: String,
    /// PO104 unit price
    pub unit_price: String,
    /// PO106 product ID qualifier
    pub product_id_qualifier: String,
    /// PO107 product identifier; empty when the element is absent
    pub product_id: String,
    /// PO109 item description, when sent
    pub description: Option<String>,
}

/// CTT transaction totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionTotals {
    /// CTT01 number of line items
    pub line_item_count: String,
    /// CTT02 hash total, when sent
    pub hash_total: Option<String>,
}

/// A fully parsed 850 document
///
/// Trailer control numbers (SE/GE/IEA) are optional: a document without them
/// still parses, the map is just missing those keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edi850Document {
    pub interchange: InterchangeHeader,
    pub group: GroupHeader,
    pub order: OrderHeader,
    pub references: Vec<ReferenceId>,
    pub parties: Vec<NameAddress>,
    pub line_items: Vec<LineItem>,
    pub totals: TransactionTotals,
    /// Keys: se_segment_count, se_control_number, ge_transaction_count,
    /// ge_control_number, iea_group_count, iea_control_number
    pub control_numbers: BTreeMap<String, String>,
}

impl Edi850Document {
    /// Party record for the given N101 entity code, first occurrence wins
    pub fn party(&self, entity_code: &str) -> Option<&NameAddress> {
        self.parties
            .iter()
            .find(|party| party.entity_code == entity_code)
    }
}
