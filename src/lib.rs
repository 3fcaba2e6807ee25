//! # Ediflow
//!
//! An EDI 850 purchase order integration pipeline: tokenize and parse the
//! X12 interchange, map it onto an ERP purchase order payload, validate
//! business rules, and submit downstream with bounded retries. Every run
//! produces a complete execution report and an audit trail.
//!
//! ## Usage
//!
//! ```bash
//! ediflow process order.edi [--endpoint URL] [--max-attempts N]
//! ```
//!
//! ## Modules
//!
//! - `config` - pipeline configuration (retry policy, delimiters, logging)
//! - `edi` - segment tokenizer, typed 850 document, document parser
//! - `erp` - ERP payload schema, mapper, business rules, submission clients
//! - `error` - run-level failure taxonomy
//! - `pipeline` - orchestrator, execution record, retry policy
//! - `storage` - write-only job record store boundary
pub mod config;
pub mod edi;
pub mod erp;
pub mod error;
pub mod pipeline;
pub mod storage;
