use serde::Serialize;

/// Pagination metadata included in list responses.
#[derive(Debug, Serialize, PartialEq, Eq, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Total number of matching items across all pages.
    #[schema(example = 47)]
    pub total: u64,
    /// Current page number (1-based).
    #[schema(example = 1)]
    pub page: u64,
    /// Number of items per page.
    #[schema(example = 10)]
    pub limit: u64,
    /// Total number of pages.
    #[schema(example = 5)]
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(total: u64, page: u64, limit: u64) -> Self {
        Self {
            total,
            page,
            limit,
            total_pages: total.div_ceil(limit),
        }
    }
}

/// Resolved `(page, limit)` from raw query values. Page is at least 1;
/// limit falls back to `default` and is clamped to `1..=max`.
pub fn page_window(page: Option<u64>, limit: Option<u64>, default: u64, max: u64) -> (u64, u64) {
    let page = Ord::max(page.unwrap_or(1), 1);
    let limit = limit.unwrap_or(default).clamp(1, max);
    (page, limit)
}

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
