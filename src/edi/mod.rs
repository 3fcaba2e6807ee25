//! EDI 850 ingestion: tokenizer, typed document, document parser

pub mod document;
pub mod parser;
pub mod tokenizer;

pub use document::Edi850Document;
pub use parser::{DocumentParser, ParseError};
pub use tokenizer::{tokenize, Delimiters, RawSegment};
