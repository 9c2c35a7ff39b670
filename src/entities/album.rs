use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "albums")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    /// Price in cents
    pub price: i64,
    pub album_art_url: Option<String>,
    pub created_at: i64,

    #[sea_orm(has_many)]
    pub cart_items: HasMany<super::cart::Entity>,
    #[sea_orm(has_many)]
    pub order_details: HasMany<super::order_detail::Entity>,
}

impl Model {
    pub fn unit_price(&self) -> Decimal {
        super::cents_to_decimal(self.price)
    }
}

impl ActiveModelBehavior for ActiveModel {}
