use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `PARSE_ERROR`,
    /// `EMPTY_FILE`, `PAYLOAD_TOO_LARGE`, `TOKEN_MISSING`, `TOKEN_INVALID`,
    /// `INVALID_CREDENTIALS`, `NOT_FOUND`, `ACCOUNT_EXISTS`, `INTERNAL_ERROR`.
    #[schema(example = "EMPTY_FILE")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "No valid data found in file")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    ParseFailed,
    EmptyFile,
    PayloadTooLarge { limit: u64 },
    TokenMissing,
    TokenInvalid,
    InvalidCredentials,
    NotFound(String),
    AccountExists,
    /// `expose` controls whether `detail` reaches the client.
    Internal { detail: String, expose: bool },
}

impl AppError {
    /// Internal error whose detail is only logged.
    pub fn internal(detail: impl Into<String>) -> Self {
        AppError::Internal {
            detail: detail.into(),
            expose: false,
        }
    }

    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::ParseFailed => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "PARSE_ERROR",
                    message: "Failed to parse file".into(),
                },
            ),
            AppError::EmptyFile => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "EMPTY_FILE",
                    message: "No valid data found in file".into(),
                },
            ),
            AppError::PayloadTooLarge { limit } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorBody {
                    code: "PAYLOAD_TOO_LARGE",
                    message: format!("File exceeds maximum size of {limit} bytes"),
                },
            ),
            AppError::TokenMissing => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_MISSING",
                    message: "Authentication required".into(),
                },
            ),
            AppError::TokenInvalid => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_INVALID",
                    message: "Invalid or expired token".into(),
                },
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "INVALID_CREDENTIALS",
                    message: "Invalid credentials".into(),
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::AccountExists => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "ACCOUNT_EXISTS",
                    message: "Email or mobile already exists".into(),
                },
            ),
            AppError::Internal { detail, expose } => {
                tracing::error!("Internal error: {}", detail);
                let message = if expose {
                    detail
                } else {
                    "An unexpected error occurred".into()
                };
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message,
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::internal(err.to_string())
    }
}
