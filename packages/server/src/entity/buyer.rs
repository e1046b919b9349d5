use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "buyer")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(column_type = "String(StringLen::N(1000))")]
    pub name: String,
    #[sea_orm(column_type = "String(StringLen::N(1000))")]
    pub email: String,
    #[sea_orm(column_type = "String(StringLen::N(1000))")]
    pub mobile: String,
    #[sea_orm(column_type = "Text")]
    pub address: String,

    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub total_invoice: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub amount_paid: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub amount_due: Decimal,

    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    pub upload_id: i32,
    #[sea_orm(belongs_to, from = "upload_id", to = "id")]
    pub upload: HasOne<super::upload::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
