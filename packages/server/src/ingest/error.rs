use std::time::Duration;

use common::DecodeError;
use sea_orm::DbErr;
use thiserror::Error;

use crate::error::AppError;

/// Whole-import failure. Skipped rows are not errors and never show up here.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("unsupported file type: {0}")]
    UnsupportedFileKind(String),

    #[error("failed to decode file: {0}")]
    Decode(#[from] DecodeError),

    #[error("no valid data found in file")]
    EmptyResult,

    #[error("database error: {0}")]
    Persistence(#[from] DbErr),

    #[error("import did not finish within {0:?}")]
    Timeout(Duration),
}

impl IngestError {
    /// Map to an HTTP error. `expose_detail` lets server-side failure
    /// details through to the client (development only).
    pub fn into_app_error(self, expose_detail: bool) -> AppError {
        match self {
            IngestError::UnsupportedFileKind(_) => {
                AppError::Validation("Only CSV and Excel files are allowed".into())
            }
            IngestError::Decode(e) => {
                tracing::warn!("Rejected unparsable upload: {}", e);
                AppError::ParseFailed
            }
            IngestError::EmptyResult => AppError::EmptyFile,
            e @ (IngestError::Persistence(_) | IngestError::Timeout(_)) => {
                if expose_detail {
                    AppError::Internal {
                        detail: format!("An error occurred while processing the file: {e}"),
                        expose: true,
                    }
                } else {
                    AppError::internal(format!("Failed to process file: {e}"))
                }
            }
        }
    }
}
