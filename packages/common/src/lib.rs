//! Spreadsheet ingestion building blocks shared by the server.
//!
//! Nothing here touches the database or HTTP: files go in, typed
//! [`BuyerRecord`]s or skip reasons come out.

pub mod buyer;
pub mod cell;
pub mod decode;
pub mod file_kind;
pub mod normalize;
pub mod sanitize;
pub mod upload;

pub use buyer::{BuyerField, BuyerRecord};
pub use cell::{CellValue, RawRow};
pub use decode::{DecodeError, MAX_ROWS, RowStream, collect_rows, decode};
pub use file_kind::FileKind;
pub use normalize::{NormalizedRow, normalize_key};
pub use sanitize::{RowOutcome, SkipReason, prepare_row, sanitize_row};
pub use upload::{TempUpload, UploadError, UploadStore};
