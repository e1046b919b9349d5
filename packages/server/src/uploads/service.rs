use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionSession, TransactionTrait,
};
use tracing::{info, warn};

use crate::entity::{buyer, upload};
use crate::models::upload::UploadSummary;

/// Result of deleting an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Upload and its buyers were removed.
    Deleted { buyers_removed: u64 },
    /// No upload with that id belongs to the caller.
    NotFound,
}

/// Owner-scoped access to upload history.
pub struct UploadService<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait + TransactionTrait> UploadService<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// One page of the owner's uploads, newest first, plus the total count.
    pub async fn list(
        &self,
        owner_id: i32,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<upload::Model>, u64), DbErr> {
        let select = upload::Entity::find().filter(upload::Column::UserId.eq(owner_id));

        let total = select.clone().count(self.conn).await?;
        let data = select
            .order_by_desc(upload::Column::CreatedAt)
            .order_by_desc(upload::Column::Id)
            .offset(Some((page - 1) * limit))
            .limit(Some(limit))
            .all(self.conn)
            .await?;

        Ok((data, total))
    }

    pub async fn find(&self, owner_id: i32, upload_id: i32) -> Result<Option<upload::Model>, DbErr> {
        upload::Entity::find_by_id(upload_id)
            .filter(upload::Column::UserId.eq(owner_id))
            .one(self.conn)
            .await
    }

    /// Totals over the buyers of `upload_id`. An upload without buyers
    /// yields zeros.
    pub async fn summary(&self, upload_id: i32) -> Result<UploadSummary, DbErr> {
        let summary = buyer::Entity::find()
            .select_only()
            .column_as(Expr::cust("CAST(COUNT(*) AS SIGNED)"), "total_buyers")
            .column_as(Expr::cust("COALESCE(SUM(`amount_due`), 0)"), "total_due")
            .column_as(Expr::cust("COALESCE(SUM(`amount_paid`), 0)"), "total_paid")
            .column_as(Expr::cust("COALESCE(SUM(`total_invoice`), 0)"), "total_invoice")
            .column_as(
                Expr::cust("CAST(COALESCE(SUM(CASE WHEN `amount_due` = 0 THEN 1 ELSE 0 END), 0) AS SIGNED)"),
                "no_due_count",
            )
            .column_as(
                Expr::cust("CAST(COALESCE(SUM(CASE WHEN `amount_due` > 0 THEN 1 ELSE 0 END), 0) AS SIGNED)"),
                "has_due_count",
            )
            .filter(buyer::Column::UploadId.eq(upload_id))
            .into_model::<UploadSummary>()
            .one(self.conn)
            .await?;

        summary.ok_or_else(|| DbErr::RecordNotFound("upload summary".into()))
    }

    /// Remove an upload and all of its buyers in one transaction.
    ///
    /// Buyers go first; the upload row is deleted only if it belongs to
    /// `owner_id`. When it does not, the transaction is rolled back and
    /// nothing changes.
    pub async fn delete(&self, owner_id: i32, upload_id: i32) -> Result<DeleteOutcome, DbErr> {
        let txn = self.conn.begin().await?;

        let buyers = buyer::Entity::delete_many()
            .filter(buyer::Column::UploadId.eq(upload_id))
            .filter(buyer::Column::UserId.eq(owner_id))
            .exec(&txn)
            .await?;

        let uploads = upload::Entity::delete_many()
            .filter(upload::Column::Id.eq(upload_id))
            .filter(upload::Column::UserId.eq(owner_id))
            .exec(&txn)
            .await?;

        if uploads.rows_affected == 0 {
            if let Err(e) = txn.rollback().await {
                warn!("Rollback failed: {}", e);
            }
            return Ok(DeleteOutcome::NotFound);
        }

        txn.commit().await?;
        info!(
            upload_id,
            buyers_removed = buyers.rows_affected,
            "Deleted upload"
        );

        Ok(DeleteOutcome::Deleted {
            buyers_removed: buyers.rows_affected,
        })
    }
}
