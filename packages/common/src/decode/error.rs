use thiserror::Error;

/// Errors raised while turning an uploaded file into raw rows.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv_async::Error),

    #[error("Excel error: {0}")]
    Excel(#[from] calamine::Error),

    #[error("Workbook contains no worksheets")]
    NoWorksheet,

    #[error("Decoder task failed: {0}")]
    Task(String),
}
