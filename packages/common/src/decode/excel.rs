use std::path::{Path, PathBuf};

use calamine::{Data, Reader, open_workbook_auto};
use futures::stream;
use futures::StreamExt;

use super::{DecodeError, MAX_ROWS, RowStream};
use crate::buyer::BuyerField;
use crate::cell::{CellValue, RawRow};

/// Read the first worksheet of a workbook positionally.
///
/// Row 1 is a header and is ignored. Columns A..G map onto the fixed
/// [`BuyerField::ALL`] order whatever the header says. Rows with no values
/// in those columns are skipped.
pub async fn decode_excel(path: &Path) -> Result<RowStream, DecodeError> {
    let path: PathBuf = path.to_path_buf();
    let rows = tokio::task::spawn_blocking(move || read_first_sheet(&path))
        .await
        .map_err(|e| DecodeError::Task(e.to_string()))??;

    Ok(stream::iter(rows.into_iter().map(Ok)).boxed())
}

fn read_first_sheet(path: &Path) -> Result<Vec<RawRow>, DecodeError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(DecodeError::NoWorksheet)??;

    let (Some((first_row, _)), Some((last_row, _))) = (range.start(), range.end()) else {
        return Ok(Vec::new());
    };

    let mut rows = Vec::new();
    // Positions are absolute so a sheet whose data starts below row 1 still
    // treats row 1 as the header.
    for row in first_row.max(1)..=last_row {
        if rows.len() >= MAX_ROWS {
            break;
        }

        let cells: Vec<CellValue> = (0..BuyerField::ALL.len() as u32)
            .map(|col| {
                range
                    .get_value((row, col))
                    .map(cell_value)
                    .unwrap_or(CellValue::Empty)
            })
            .collect();

        if cells.iter().all(CellValue::is_empty) {
            continue;
        }

        rows.push(
            BuyerField::ALL
                .iter()
                .map(|field| field.column_name().to_string())
                .zip(cells)
                .collect(),
        );
    }

    Ok(rows)
}

fn cell_value(data: &Data) -> CellValue {
    match data {
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(CellValue::DateTime)
            .unwrap_or(CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::Empty,
    }
}
