pub mod album;
pub mod cart;
pub mod order;
pub mod order_detail;

use rust_decimal::Decimal;

/// Prices and totals are stored as integer cents.
pub fn cents_to_decimal(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}
