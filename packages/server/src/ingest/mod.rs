//! Spreadsheet import: decode, clean, and persist buyers in one transaction.

mod error;
mod service;

pub use error::IngestError;
pub use service::{IngestRequest, IngestService, IngestSummary};
