use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A tenant account. Every other row is owned by exactly one business.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "businesses")]
#[schema(as = Business)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub business_id: i32,
    #[sea_orm(unique)]
    pub username: String,
    #[serde(skip_serializing, default)]
    #[schema(ignore)]
    pub password_hash: String,
    pub business_name: String,
    pub address: Option<String>,
    pub creation_date: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if insert && self.creation_date.is_not_set() {
            self.creation_date = sea_orm::Set(Utc::now());
        }
        Ok(self)
    }
}
