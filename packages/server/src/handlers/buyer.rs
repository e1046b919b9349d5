use std::io;
use std::time::Duration;

use axum::Json;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use common::file_kind::is_allowed_upload;
use common::upload::UploadError;
use futures::TryStreamExt;
use sea_orm::prelude::{Decimal, Expr};
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tokio_util::io::StreamReader;
use tracing::instrument;

use crate::entity::buyer;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::input::AppQuery;
use crate::ingest::{IngestRequest, IngestService};
use crate::models::buyer::*;
use crate::models::shared::{Pagination, escape_like, page_window};
use crate::state::AppState;
use crate::utils::filename::clean_upload_filename;

/// Multipart framing allowance on top of the file size cap.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[utoipa::path(
    post,
    path = "/upload",
    tag = "Buyers",
    operation_id = "uploadBuyers",
    summary = "Import buyers from a CSV or Excel file",
    description = "Reads the multipart field `file` (.csv, .xls or .xlsx, at most 5 MB by default). CSV columns are matched by header name; Excel columns are read by position (name, email, mobile, address, total invoice, amount paid, amount due). Rows without a name, email or mobile are skipped. All accepted rows are stored in one transaction.",
    request_body(content_type = "multipart/form-data", description = "Spreadsheet in the `file` field"),
    responses(
        (status = 200, description = "File imported", body = UploadBuyersResponse),
        (status = 400, description = "Bad upload (VALIDATION_ERROR, PARSE_ERROR, EMPTY_FILE)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 413, description = "File too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
        (status = 500, description = "Import failed (INTERNAL_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user_id = auth_user.user_id))]
pub async fn upload_buyers(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadBuyersResponse>, AppError> {
    let mut spooled = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field
            .file_name()
            .ok_or_else(|| AppError::Validation("File field must have a filename".into()))?;
        let file_name = clean_upload_filename(file_name)
            .map_err(|e| AppError::Validation(e.message().into()))?
            .to_string();
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        if !is_allowed_upload(&file_name, &mime_type) {
            return Err(AppError::Validation(
                "Only CSV and Excel files are allowed".into(),
            ));
        }

        let body = field.map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e));
        let reader = StreamReader::new(body);
        tokio::pin!(reader);

        let upload = state
            .uploads
            .save(&file_name, reader)
            .await
            .map_err(upload_error)?;

        spooled = Some((upload, file_name, mime_type));
        break;
    }

    let (file, original_filename, mime_type) =
        spooled.ok_or_else(|| AppError::Validation("No file uploaded".into()))?;

    let timeout = Duration::from_secs(state.config.ingest.transaction_timeout_secs);
    let summary = IngestService::new(&state.db)
        .with_timeout(timeout)
        .ingest(IngestRequest {
            file,
            owner_id: auth_user.user_id,
            original_filename,
            mime_type: Some(mime_type),
        })
        .await
        .map_err(|e| e.into_app_error(state.config.server.expose_error_detail()))?;

    Ok(Json(UploadBuyersResponse {
        message: format!("Successfully imported {} buyers", summary.inserted_count),
        count: summary.inserted_count,
        upload_id: summary.upload_id,
        file_name: summary.file_name,
    }))
}

fn upload_error(err: UploadError) -> AppError {
    match err {
        UploadError::TooLarge { limit } => AppError::PayloadTooLarge { limit },
        UploadError::Io(e) if e.kind() == io::ErrorKind::InvalidData => {
            AppError::Validation(format!("Upload read error: {e}"))
        }
        UploadError::Io(e) => AppError::internal(format!("Failed to store upload: {e}")),
    }
}

/// Body limit for the upload route: the file cap plus multipart framing.
pub fn upload_body_limit(max_file_size: u64) -> DefaultBodyLimit {
    DefaultBodyLimit::max(max_file_size as usize + MULTIPART_OVERHEAD)
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Buyers",
    operation_id = "listBuyers",
    summary = "List buyers with filters and pagination",
    description = "Returns the caller's buyers, newest first. `search` matches name, email or mobile case-insensitively. `dueStatus` is `all`, `no_due` (amount due is zero) or `has_due`. Invoice bounds are inclusive. Unparsable filter values are ignored.",
    params(BuyerListQuery),
    responses(
        (status = 200, description = "Page of buyers", body = BuyerListResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id))]
pub async fn list_buyers(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<BuyerListQuery>,
) -> Result<Json<BuyerListResponse>, AppError> {
    let (page, limit) = page_window(query.page, query.limit, 10, 100);
    let filters = BuyerFilters::from_query(&query);

    let select = buyer::Entity::find().filter(buyer_condition(auth_user.user_id, &filters));

    let total = select.clone().count(&state.db).await?;

    let data = select
        .select_only()
        .column(buyer::Column::Id)
        .column(buyer::Column::Name)
        .column(buyer::Column::Email)
        .column(buyer::Column::Mobile)
        .column(buyer::Column::Address)
        .column(buyer::Column::TotalInvoice)
        .column(buyer::Column::AmountPaid)
        .column(buyer::Column::AmountDue)
        .column(buyer::Column::CreatedAt)
        .order_by_desc(buyer::Column::CreatedAt)
        .order_by_desc(buyer::Column::Id)
        .offset(Some((page - 1) * limit))
        .limit(Some(limit))
        .into_model::<BuyerListItem>()
        .all(&state.db)
        .await?;

    Ok(Json(BuyerListResponse {
        data,
        pagination: Pagination::new(total, page, limit),
        filters,
    }))
}

/// WHERE clause for a buyer listing, always scoped to `owner_id`.
pub fn buyer_condition(owner_id: i32, filters: &BuyerFilters) -> Condition {
    let mut cond = Condition::all().add(buyer::Column::UserId.eq(owner_id));

    if let Some(upload_id) = filters.upload_id {
        cond = cond.add(buyer::Column::UploadId.eq(upload_id));
    }

    if let Some(ref search) = filters.search {
        let pattern = format!("%{}%", escape_like(search).to_lowercase());
        let matches = |col: buyer::Column| {
            Expr::expr(Func::lower(Expr::col(col)))
                .like(LikeExpr::new(pattern.clone()).escape('\\'))
        };
        cond = cond.add(
            Condition::any()
                .add(matches(buyer::Column::Name))
                .add(matches(buyer::Column::Email))
                .add(matches(buyer::Column::Mobile)),
        );
    }

    cond = match filters.due_status {
        DueStatus::All => cond,
        DueStatus::NoDue => cond.add(buyer::Column::AmountDue.eq(Decimal::ZERO)),
        DueStatus::HasDue => cond.add(buyer::Column::AmountDue.gt(Decimal::ZERO)),
    };

    if let Some(min) = filters.min_invoice {
        cond = cond.add(buyer::Column::TotalInvoice.gte(min));
    }
    if let Some(max) = filters.max_invoice {
        cond = cond.add(buyer::Column::TotalInvoice.lte(max));
    }

    cond
}
