//! ERP-facing half of the pipeline: payload schema, schema mapper, business
//! rules, and submission clients (HTTP and simulated)

pub mod client;
pub mod mapper;
pub mod mock;
pub mod rules;
pub mod schema;

pub use client::{ErpApiError, ErpClient, ErpResponse, HttpErpClient, SubmitError};
pub use mapper::{ErpMapper, TransformError};
pub use mock::{ErrorScenario, MockErp};
pub use rules::validate_purchase_order;
pub use schema::{ErpLineItem, ErpPurchaseOrder, ErpShipTo, ErpVendor};

use chrono::{SecondsFormat, Utc};

/// UTC timestamp in the RFC 3339 shape the ERP contract uses
pub(crate) fn utc_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
