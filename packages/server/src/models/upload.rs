use chrono::{DateTime, Utc};
use sea_orm::FromQueryResult;
use sea_orm::prelude::Decimal;
use serde::{Deserialize, Serialize};

use super::shared::Pagination;

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UploadListQuery {
    /// Page number (default 1).
    pub page: Option<u64>,
    /// Items per page, 1-50 (default 10).
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UploadResponse {
    #[schema(example = 17)]
    pub id: i32,
    /// Name the file was stored under.
    #[schema(example = "1718000000000-buyers.csv")]
    pub filename: String,
    #[schema(example = "buyers.csv")]
    pub original_name: String,
    /// `CSV` or `Excel`.
    #[schema(example = "CSV")]
    pub file_type: String,
    /// Buyers imported from this file.
    #[schema(example = 250)]
    pub row_count: i32,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::upload::Model> for UploadResponse {
    fn from(m: crate::entity::upload::Model) -> Self {
        Self {
            id: m.id,
            filename: m.filename,
            original_name: m.original_name,
            file_type: m.file_type,
            row_count: m.row_count,
            created_at: m.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UploadListResponse {
    pub data: Vec<UploadResponse>,
    pub pagination: Pagination,
}

/// Aggregates over the buyers of one upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult, utoipa::ToSchema)]
pub struct UploadSummary {
    #[schema(example = 250)]
    pub total_buyers: i64,
    #[schema(value_type = String, example = "15000.00")]
    pub total_due: Decimal,
    #[schema(value_type = String, example = "42000.00")]
    pub total_paid: Decimal,
    #[schema(value_type = String, example = "57000.00")]
    pub total_invoice: Decimal,
    #[schema(example = 180)]
    pub no_due_count: i64,
    #[schema(example = 70)]
    pub has_due_count: i64,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UploadDetailResponse {
    pub upload: UploadResponse,
    pub summary: UploadSummary,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Upload deleted successfully")]
    pub message: String,
}
