use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// A single line item: `count` copies of one album in the cart identified by `cart_id`.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "carts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub record_id: i64,
    /// Session generated id or username
    pub cart_id: String,
    pub album_id: i64,
    pub count: i32,
    pub date_created: DateTime<Utc>,

    #[sea_orm(belongs_to, from = "album_id", to = "id")]
    pub album: Option<super::album::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
