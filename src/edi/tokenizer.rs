//! Segment tokenizer for delimiter-based EDI text
//!
//! Splits a raw interchange into an ordered sequence of segments, each an
//! ordered sequence of trimmed element strings. No segment ordering or
//! grouping rules are enforced here; segment semantics belong to the
//! document parser.

use serde::{Deserialize, Serialize};

/// Delimiter set for one interchange
///
/// X12 interchanges carry three delimiters. The sub-element separator is
/// reserved: elements containing it pass through as single strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delimiters {
    /// Terminates each segment
    #[serde(default = "default_segment")]
    pub segment: char,
    /// Separates elements within a segment
    #[serde(default = "default_element")]
    pub element: char,
    /// Separates components within an element (not expanded)
    #[serde(default = "default_subelement")]
    pub subelement: char,
}

fn default_segment() -> char {
    '~'
}

fn default_element() -> char {
    '*'
}

fn default_subelement() -> char {
    ':'
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            segment: default_segment(),
            element: default_element(),
            subelement: default_subelement(),
        }
    }
}

/// One tokenized segment: an ordered list of trimmed elements
///
/// Element 0 is the segment identifier code (e.g. "BEG", "PO1").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSegment {
    elements: Vec<String>,
}

impl RawSegment {
    /// Build a segment from already-split elements
    pub fn from_elements(elements: Vec<String>) -> Self {
        Self { elements }
    }

    /// Segment identifier code (element 0), or `""` for an empty segment
    pub fn id(&self) -> &str {
        self.elements.first().map(String::as_str).unwrap_or("")
    }

    /// Element at `index`, if present
    pub fn element(&self, index: usize) -> Option<&str> {
        self.elements.get(index).map(String::as_str)
    }

    /// Element at `index`, or `""` when the segment is too short
    pub fn element_or_empty(&self, index: usize) -> &str {
        self.element(index).unwrap_or("")
    }

    /// Number of elements, including the identifier
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Tokenize raw EDI text into segments
///
/// The whole document is trimmed, split on the segment delimiter, and blank
/// segments (common when files end with a trailing terminator or carry
/// newlines between segments) are discarded. Each surviving segment is split
/// on the element delimiter with every element trimmed. This never fails: an
/// empty or garbage input simply yields an empty or unrecognizable sequence.
pub fn tokenize(input: &str, delimiters: &Delimiters) -> Vec<RawSegment> {
    input
        .trim()
        .split(delimiters.segment)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| RawSegment {
            elements: segment
                .split(delimiters.element)
                .map(|element| element.trim().to_string())
                .collect(),
        })
        .collect()
}
