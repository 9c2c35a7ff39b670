use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub order_date: DateTime<Utc>,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
    pub email: String,
    /// Total in cents, computed from the cart at checkout
    pub total: i64,

    #[sea_orm(has_many)]
    pub order_details: HasMany<super::order_detail::Entity>,
}

impl Model {
    pub fn total_amount(&self) -> Decimal {
        super::cents_to_decimal(self.total)
    }
}

impl ActiveModelBehavior for ActiveModel {}
