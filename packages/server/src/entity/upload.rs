use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One imported spreadsheet.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "upload")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub filename: String, // name on disk
    pub original_name: String,
    pub file_type: String, // "CSV" or "Excel"
    pub row_count: i32,

    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    #[sea_orm(has_many)]
    pub buyers: HasMany<super::buyer::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
