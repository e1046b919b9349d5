use std::time::Duration;

use sea_orm::sea_query::{Index, IndexCreateStatement, MysqlQueryBuilder};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use tracing::{info, warn};

use crate::config::DatabaseConfig;
use crate::entity::{buyer, upload};

pub async fn init_db(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(config.url.clone());

    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(true);

    let db = Database::connect(opt).await?;
    db.get_schema_registry("server::entity::*")
        .sync(&db)
        .await?;

    Ok(db)
}

/// Create the secondary indexes used by the listing queries.
///
/// Failures are logged and skipped; an index that already exists is the
/// common case on restart.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // SELECT ... FROM buyer WHERE user_id = ? AND upload_id = ?
    let buyer_owner_upload = Index::create()
        .name("idx_buyer_user_upload")
        .table(buyer::Entity)
        .col(buyer::Column::UserId)
        .col(buyer::Column::UploadId)
        .to_owned();

    // SELECT ... FROM upload WHERE user_id = ? ORDER BY created_at DESC
    let upload_owner_created = Index::create()
        .name("idx_upload_user_created")
        .table(upload::Entity)
        .col(upload::Column::UserId)
        .col(upload::Column::CreatedAt)
        .to_owned();

    create_index(db, "idx_buyer_user_upload", buyer_owner_upload).await;
    create_index(db, "idx_upload_user_created", upload_owner_created).await;

    Ok(())
}

async fn create_index(db: &DatabaseConnection, name: &str, stmt: IndexCreateStatement) {
    let sql = stmt.to_string(MysqlQueryBuilder);

    match db.execute_unprepared(&sql).await {
        Ok(_) => info!("Ensured index {} exists", name),
        Err(e) if e.to_string().contains("Duplicate key name") => {
            info!("Index {} already exists", name)
        }
        Err(e) => warn!("Failed to create index {}: {}", name, e),
    }
}
