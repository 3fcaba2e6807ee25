//! EDI 850 document parser
//!
//! Locates segments by their leading identifier and maps fixed element
//! positions onto the typed document. Required segments (ISA, GS, BEG, CTT)
//! fail the parse when absent or too short; repeatable segments (REF, N1,
//! PO1) are skipped individually when below their minimum arity; trailer
//! segments (SE, GE, IEA) are captured opportunistically.

use thiserror::Error;

use super::document::{
    Edi850Document, GroupHeader, InterchangeHeader, LineItem, NameAddress, OrderHeader,
    ReferenceId, TransactionTotals,
};
use super::tokenizer::{tokenize, Delimiters, RawSegment};
use std::collections::BTreeMap;

/// Raised when a required segment is absent or below its minimum arity
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{segment} segment not found or incomplete")]
pub struct ParseError {
    segment: &'static str,
}

impl ParseError {
    fn missing(segment: &'static str) -> Self {
        Self { segment }
    }

    /// Identifier of the segment that failed the parse
    pub fn segment(&self) -> &'static str {
        self.segment
    }
}

/// Parser for one delimiter convention
#[derive(Debug, Clone)]
pub struct DocumentParser {
    delimiters: Delimiters,
}

impl DocumentParser {
    pub fn new(delimiters: Delimiters) -> Self {
        Self { delimiters }
    }

    /// Parse raw EDI text into a typed 850 document.
    ///
    /// Envelope headers are checked in envelope order: ISA first, then GS,
    /// then BEG, with CTT last. The first missing or short required segment
    /// aborts the parse.
    pub fn parse(&self, input: &str) -> Result<Edi850Document, ParseError> {
        let segments = tokenize(input, &self.delimiters);

        let interchange = parse_interchange(&segments)?;
        let group = parse_group(&segments)?;
        let order = parse_order(&segments)?;
        let references = parse_references(&segments);
        let parties = parse_parties(&segments);
        let line_items = parse_line_items(&segments);
        let totals = parse_totals(&segments)?;
        let control_numbers = parse_control_trailers(&segments);

        Ok(Edi850Document {
            interchange,
            group,
            order,
            references,
            parties,
            line_items,
            totals,
            control_numbers,
        })
    }
}

impl Default for DocumentParser {
    fn default() -> Self {
        Self::new(Delimiters::default())
    }
}

fn find_first<'a>(segments: &'a [RawSegment], id: &str) -> Option<&'a RawSegment> {
    segments.iter().find(|segment| segment.id() == id)
}

fn find_all<'a>(
    segments: &'a [RawSegment],
    id: &'a str,
) -> impl Iterator<Item = &'a RawSegment> + 'a {
    segments.iter().filter(move |segment| segment.id() == id)
}

fn require<'a>(
    segments: &'a [RawSegment],
    id: &'static str,
    min_len: usize,
) -> Result<&'a RawSegment, ParseError> {
    find_first(segments, id)
        .filter(|segment| segment.len() >= min_len)
        .ok_or(ParseError::missing(id))
}

fn parse_interchange(segments: &[RawSegment]) -> Result<InterchangeHeader, ParseError> {
    let isa = require(segments, "ISA", 17)?;
    Ok(InterchangeHeader {
        authorization_info: isa.element_or_empty(2).to_string(),
        security_info: isa.element_or_empty(4).to_string(),
        sender_id: isa.element_or_empty(6).to_string(),
        receiver_id: isa.element_or_empty(8).to_string(),
        date: isa.element_or_empty(9).to_string(),
        time: isa.element_or_empty(10).to_string(),
        control_number: isa.element_or_empty(13).to_string(),
        acknowledgment_requested: isa.element_or_empty(14).to_string(),
        usage_indicator: isa.element_or_empty(15).to_string(),
    })
}

fn parse_group(segments: &[RawSegment]) -> Result<GroupHeader, ParseError> {
    let gs = require(segments, "GS", 9)?;
    Ok(GroupHeader {
        functional_id_code: gs.element_or_empty(1).to_string(),
        sender_code: gs.element_or_empty(2).to_string(),
        receiver_code: gs.element_or_empty(3).to_string(),
        date: gs.element_or_empty(4).to_string(),
        time: gs.element_or_empty(5).to_string(),
        control_number: gs.element_or_empty(6).to_string(),
        responsible_agency: gs.element_or_empty(7).to_string(),
        version: gs.element_or_empty(8).to_string(),
    })
}

fn parse_order(segments: &[RawSegment]) -> Result<OrderHeader, ParseError> {
    // BEG04 (release number) is not captured.
    let beg = require(segments, "BEG", 6)?;
    Ok(OrderHeader {
        transaction_set_purpose: beg.element_or_empty(1).to_string(),
        purchase_order_type: beg.element_or_empty(2).to_string(),
        purchase_order_number: beg.element_or_empty(3).to_string(),
        date: beg.element_or_empty(5).to_string(),
    })
}

fn parse_references(segments: &[RawSegment]) -> Vec<ReferenceId> {
    find_all(segments, "REF")
        .filter(|segment| segment.len() >= 3)
        .map(|segment| ReferenceId {
            qualifier: segment.element_or_empty(1).to_string(),
            value: segment.element_or_empty(2).to_string(),
        })
        .collect()
}

fn parse_parties(segments: &[RawSegment]) -> Vec<NameAddress> {
    find_all(segments, "N1")
        .filter(|segment| segment.len() >= 3)
        .map(|segment| NameAddress {
            entity_code: segment.element_or_empty(1).to_string(),
            name: segment.element_or_empty(2).to_string(),
            id_qualifier: segment.element(3).map(str::to_string),
            id_code: segment.element(4).map(str::to_string),
        })
        .collect()
}

fn parse_line_items(segments: &[RawSegment]) -> Vec<LineItem> {
    // PO105 (basis of unit price) is not captured.
    find_all(segments, "PO1")
        .filter(|segment| segment.len() >= 7)
        .map(|segment| LineItem {
            line_number: segment.element_or_empty(1).to_string(),
            quantity: segment.element_or_empty(2).to_string(),
            unit_of_measure: segment.element_or_empty(3).to_string(),
            unit_price: segment.element_or_empty(4).to_string(),
            product_id_qualifier: segment.element_or_empty(6).to_string(),
            product_id: segment.element_or_empty(7).to_string(),
            description: segment.element(9).map(str::to_string),
        })
        .collect()
}

fn parse_totals(segments: &[RawSegment]) -> Result<TransactionTotals, ParseError> {
    let ctt = require(segments, "CTT", 2)?;
    Ok(TransactionTotals {
        line_item_count: ctt.element_or_empty(1).to_string(),
        hash_total: ctt.element(2).map(str::to_string),
    })
}

fn parse_control_trailers(segments: &[RawSegment]) -> BTreeMap<String, String> {
    let mut control_numbers = BTreeMap::new();
    let trailers = [
        ("SE", "se_segment_count", "se_control_number"),
        ("GE", "ge_transaction_count", "ge_control_number"),
        ("IEA", "iea_group_count", "iea_control_number"),
    ];
    for (id, count_key, control_key) in trailers {
        if let Some(segment) = find_first(segments, id).filter(|segment| segment.len() >= 3) {
            control_numbers.insert(count_key.to_string(), segment.element_or_empty(1).to_string());
            control_numbers.insert(
                control_key.to_string(),
                segment.element_or_empty(2).to_string(),
            );
        }
    }
    control_numbers
}
