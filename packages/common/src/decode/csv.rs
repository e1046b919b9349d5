use std::path::Path;

use csv_async::{AsyncReader, AsyncReaderBuilder, ByteRecord};
use futures::{StreamExt, stream};
use tokio::fs::File;

use super::{DecodeError, MAX_ROWS, RowStream};
use crate::cell::{CellValue, RawRow};

const BOM: &str = "\u{feff}";

/// Stream a header-driven CSV file.
///
/// The first record names the columns; each later record is zipped against
/// it by position. Short records only carry the cells they have, and cells
/// past the last header are dropped. Invalid UTF-8 is replaced lossily.
pub async fn decode_csv(path: &Path) -> Result<RowStream, DecodeError> {
    let file = File::open(path).await?;
    let mut reader = AsyncReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .create_reader(file);

    let headers: Vec<String> = reader
        .byte_headers()
        .await?
        .iter()
        .map(|h| String::from_utf8_lossy(h).into_owned())
        .enumerate()
        .map(|(i, h)| match h.strip_prefix(BOM) {
            Some(stripped) if i == 0 => stripped.to_string(),
            _ => h,
        })
        .collect();

    let state = RecordState {
        reader,
        headers,
        emitted: 0,
    };
    Ok(stream::unfold(state, next_row).boxed())
}

struct RecordState {
    reader: AsyncReader<File>,
    headers: Vec<String>,
    emitted: usize,
}

async fn next_row(mut state: RecordState) -> Option<(Result<RawRow, DecodeError>, RecordState)> {
    if state.emitted >= MAX_ROWS {
        return None;
    }

    let mut record = ByteRecord::new();
    match state.reader.read_byte_record(&mut record).await {
        Ok(true) => {
            state.emitted += 1;
            let row = zip_record(&state.headers, &record);
            Some((Ok(row), state))
        }
        Ok(false) => None,
        Err(e) => {
            // Stop after the first parse error; the caller aborts the import.
            state.emitted = MAX_ROWS;
            Some((Err(e.into()), state))
        }
    }
}

fn zip_record(headers: &[String], record: &ByteRecord) -> RawRow {
    headers
        .iter()
        .zip(record.iter())
        .map(|(header, cell)| {
            let text = String::from_utf8_lossy(cell).into_owned();
            (header.clone(), CellValue::Text(text))
        })
        .collect()
}
