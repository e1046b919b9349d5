use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub mobile: String,
    #[serde(skip_serializing)]
    pub password: String, // argon2 PHC string

    #[sea_orm(has_many)]
    pub uploads: HasMany<super::upload::Entity>,

    #[sea_orm(has_many)]
    pub buyers: HasMany<super::buyer::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
