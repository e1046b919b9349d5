use std::time::Duration;

use chrono::Utc;
use common::{FileKind, RawRow, RowOutcome, TempUpload, collect_rows, prepare_row};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseTransaction, DbErr, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use tracing::{debug, error, info, warn};

use super::IngestError;
use crate::entity::{buyer, upload};

/// Default bound on the transactional phase of an import.
pub const DEFAULT_TRANSACTION_TIMEOUT: Duration = Duration::from_secs(60);

/// A spooled file to import on behalf of `owner_id`.
pub struct IngestRequest {
    pub file: TempUpload,
    pub owner_id: i32,
    pub original_filename: String,
    pub mime_type: Option<String>,
}

/// Outcome of a committed import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestSummary {
    pub inserted_count: u64,
    pub upload_id: i32,
    pub file_name: String,
}

pub struct IngestService<'a, C> {
    conn: &'a C,
    timeout: Duration,
}

impl<'a, C: ConnectionTrait + TransactionTrait<Transaction = DatabaseTransaction>> IngestService<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self {
            conn,
            timeout: DEFAULT_TRANSACTION_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Import one uploaded spreadsheet.
    ///
    /// Either the upload record and every accepted buyer are committed, or
    /// nothing is. The spooled file is removed before returning.
    pub async fn ingest(&self, request: IngestRequest) -> Result<IngestSummary, IngestError> {
        let IngestRequest {
            file,
            owner_id,
            original_filename,
            mime_type,
        } = request;

        let result = self
            .run(&file, owner_id, &original_filename, mime_type.as_deref())
            .await;
        file.cleanup().await;
        result
    }

    async fn run(
        &self,
        file: &TempUpload,
        owner_id: i32,
        original_filename: &str,
        mime_type: Option<&str>,
    ) -> Result<IngestSummary, IngestError> {
        let kind = FileKind::detect(original_filename, mime_type).ok_or_else(|| {
            IngestError::UnsupportedFileKind(mime_type.unwrap_or(original_filename).to_string())
        })?;

        let rows = collect_rows(file.path(), kind).await?;
        if rows.is_empty() {
            return Err(IngestError::EmptyResult);
        }

        let upload = upload::ActiveModel {
            filename: Set(file.stored_name().to_string()),
            original_name: Set(original_filename.to_string()),
            file_type: Set(kind.as_str().to_string()),
            row_count: Set(rows.len() as i32),
            user_id: Set(owner_id),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        let (upload_id, inserted_count) =
            tokio::time::timeout(self.timeout, self.persist(upload, &rows, owner_id))
                .await
                .map_err(|_| IngestError::Timeout(self.timeout))??;

        info!(
            upload_id,
            inserted_count,
            decoded = rows.len(),
            file_type = kind.as_str(),
            "Imported buyers"
        );

        Ok(IngestSummary {
            inserted_count,
            upload_id,
            file_name: original_filename.to_string(),
        })
    }

    /// Run the inserts in one transaction, rolling back on the first failure.
    async fn persist(
        &self,
        upload: upload::ActiveModel,
        rows: &[RawRow],
        owner_id: i32,
    ) -> Result<(i32, u64), IngestError> {
        let txn = self.conn.begin().await?;

        match insert_all(&txn, upload, rows, owner_id).await {
            Ok(counts) => {
                txn.commit().await?;
                Ok(counts)
            }
            Err(e) => {
                error!("Import failed, rolling back: {}", e);
                if let Err(rollback_err) = txn.rollback().await {
                    warn!("Rollback failed: {}", rollback_err);
                }
                Err(e.into())
            }
        }
    }
}

async fn insert_all(
    txn: &DatabaseTransaction,
    upload: upload::ActiveModel,
    rows: &[RawRow],
    owner_id: i32,
) -> Result<(i32, u64), DbErr> {
    let upload_id = upload::Entity::insert(upload).exec(txn).await?.last_insert_id;

    let now = Utc::now();
    let mut inserted: u64 = 0;
    for (index, raw) in rows.iter().enumerate() {
        let record = match prepare_row(raw) {
            RowOutcome::Accepted(record) => record,
            RowOutcome::Skipped(reason) => {
                debug!(row = index + 1, ?reason, "Skipping row");
                continue;
            }
        };

        let model = buyer::ActiveModel {
            name: Set(record.name),
            email: Set(record.email),
            mobile: Set(record.mobile),
            address: Set(record.address),
            total_invoice: Set(record.total_invoice),
            amount_paid: Set(record.amount_paid),
            amount_due: Set(record.amount_due),
            user_id: Set(owner_id),
            upload_id: Set(upload_id),
            created_at: Set(now),
            ..Default::default()
        };
        buyer::Entity::insert(model)
            .exec_without_returning(txn)
            .await?;
        inserted += 1;
    }

    upload::Entity::update_many()
        .col_expr(upload::Column::RowCount, Expr::value(inserted as i32))
        .filter(upload::Column::Id.eq(upload_id))
        .exec(txn)
        .await?;

    Ok((upload_id, inserted))
}
