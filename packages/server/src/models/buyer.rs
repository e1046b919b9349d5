use std::str::FromStr;

use chrono::{DateTime, Utc};
use common::CellValue;
use common::sanitize::sanitize_string;
use sea_orm::FromQueryResult;
use sea_orm::prelude::Decimal;
use serde::{Deserialize, Serialize};

use super::shared::Pagination;

/// Longest search term applied, in characters.
pub const MAX_SEARCH_LEN: usize = 100;

/// Raw query string of `GET /buyers`.
///
/// Values are taken as text and resolved leniently: an unparsable number or
/// unknown status is ignored rather than rejected.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct BuyerListQuery {
    /// Only buyers from this upload.
    pub upload_id: Option<String>,
    /// Page number (default 1).
    pub page: Option<u64>,
    /// Items per page, 1-100 (default 10).
    pub limit: Option<u64>,
    /// Case-insensitive match against name, email or mobile.
    pub search: Option<String>,
    /// `all` (default), `no_due` or `has_due`.
    pub due_status: Option<String>,
    /// Inclusive lower bound on total invoice.
    pub min_invoice: Option<String>,
    /// Inclusive upper bound on total invoice.
    pub max_invoice: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DueStatus {
    #[default]
    All,
    NoDue,
    HasDue,
}

impl DueStatus {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("no_due") => DueStatus::NoDue,
            Some("has_due") => DueStatus::HasDue,
            _ => DueStatus::All,
        }
    }
}

/// Filters actually applied to a buyer listing; echoed in the response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BuyerFilters {
    pub due_status: DueStatus,
    #[schema(value_type = Option<String>, example = "100.00")]
    pub min_invoice: Option<Decimal>,
    #[schema(value_type = Option<String>, example = "5000.00")]
    pub max_invoice: Option<Decimal>,
    pub upload_id: Option<i32>,
    #[serde(skip)]
    pub search: Option<String>,
}

impl BuyerFilters {
    pub fn from_query(query: &BuyerListQuery) -> Self {
        let search = query
            .search
            .as_deref()
            .map(|s| {
                sanitize_string(&CellValue::from(s))
                    .chars()
                    .take(MAX_SEARCH_LEN)
                    .collect::<String>()
            })
            .filter(|s| !s.is_empty());

        Self {
            due_status: DueStatus::parse(query.due_status.as_deref()),
            min_invoice: parse_amount(query.min_invoice.as_deref()),
            max_invoice: parse_amount(query.max_invoice.as_deref()),
            upload_id: query
                .upload_id
                .as_deref()
                .and_then(|s| s.trim().parse().ok()),
            search,
        }
    }
}

fn parse_amount(raw: Option<&str>) -> Option<Decimal> {
    raw.and_then(|s| Decimal::from_str(s.trim()).ok())
}

#[derive(Debug, Serialize, FromQueryResult, utoipa::ToSchema)]
pub struct BuyerListItem {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub address: String,
    #[schema(value_type = String, example = "1200.50")]
    pub total_invoice: Decimal,
    #[schema(value_type = String, example = "200.00")]
    pub amount_paid: Decimal,
    #[schema(value_type = String, example = "1000.50")]
    pub amount_due: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct BuyerListResponse {
    pub data: Vec<BuyerListItem>,
    pub pagination: Pagination,
    pub filters: BuyerFilters,
}

/// Result of a successful spreadsheet import.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadBuyersResponse {
    #[schema(example = "Successfully imported 2 buyers")]
    pub message: String,
    #[schema(example = 2)]
    pub count: u64,
    #[schema(example = 17)]
    pub upload_id: i32,
    #[schema(example = "buyers.csv")]
    pub file_name: String,
}
