pub mod catalog;
pub mod order;
pub mod shopping_cart;
