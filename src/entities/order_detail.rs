use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "order_details")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub order_id: i64,
    pub album_id: i64,
    pub quantity: i32,
    /// Album price in cents at the time of purchase
    pub unit_price: i64,

    #[sea_orm(belongs_to, from = "order_id", to = "id")]
    pub order: Option<super::order::Entity>,
    #[sea_orm(belongs_to, from = "album_id", to = "id")]
    pub album: Option<super::album::Entity>,
}

impl Model {
    pub fn unit_price_amount(&self) -> Decimal {
        super::cents_to_decimal(self.unit_price)
    }
}

impl ActiveModelBehavior for ActiveModel {}
