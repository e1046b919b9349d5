//! Spreadsheet decoding.
//!
//! Both formats produce the same [`RawRow`] stream. CSV rows are keyed by
//! their header text; Excel rows are read by column position and keyed by
//! the canonical buyer column names.

mod csv;
mod error;
mod excel;

use std::path::Path;

use futures::TryStreamExt;
use futures::stream::BoxStream;

pub use self::csv::decode_csv;
pub use error::DecodeError;
pub use excel::decode_excel;

use crate::cell::RawRow;
use crate::file_kind::FileKind;

/// Rows read from a single file are capped at this many.
pub const MAX_ROWS: usize = 10_000;

pub type RowStream = BoxStream<'static, Result<RawRow, DecodeError>>;

/// Open `path` with the decoder for `kind`.
pub async fn decode(path: &Path, kind: FileKind) -> Result<RowStream, DecodeError> {
    match kind {
        FileKind::Csv => decode_csv(path).await,
        FileKind::Excel => decode_excel(path).await,
    }
}

/// Drain a decoder into memory. The first decode error aborts the read.
pub async fn collect_rows(path: &Path, kind: FileKind) -> Result<Vec<RawRow>, DecodeError> {
    decode(path, kind).await?.try_collect().await
}
