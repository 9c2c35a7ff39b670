use std::sync::Arc;

use color_eyre::eyre::{Context, OptionExt, Result};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use crate::database::Database;
use crate::entities;

pub struct OrderDetailWithAlbum {
    pub detail: entities::order_detail::Model,
    pub album: entities::album::Model,
}

pub struct OrderWithDetails {
    pub order: entities::order::Model,
    pub details: Vec<OrderDetailWithAlbum>,
}

pub struct OrderService {
    db: Arc<Database>,
}

impl OrderService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Load an order placed by `username`. Orders of other users are reported as missing.
    pub async fn find_order(
        &self,
        order_id: i64,
        username: &str,
    ) -> Result<Option<OrderWithDetails>> {
        let order = entities::order::Entity::find_by_id(order_id)
            .filter(entities::order::Column::Username.eq(username))
            .one(&self.db.conn)
            .await
            .context(format!("Failed to fetch order {}", order_id))?;

        let Some(order) = order else {
            log::debug!("Order {} not found for user {}", order_id, username);
            return Ok(None);
        };

        let rows = entities::order_detail::Entity::find()
            .filter(entities::order_detail::Column::OrderId.eq(order.id))
            .order_by_asc(entities::order_detail::Column::Id)
            .find_also_related(entities::album::Entity)
            .all(&self.db.conn)
            .await
            .context("Failed to fetch order details")?;

        let mut details = Vec::with_capacity(rows.len());
        for (detail, album) in rows {
            let album = album.ok_or_eyre(format!(
                "Order detail {} has no associated album",
                detail.id
            ))?;
            details.push(OrderDetailWithAlbum { detail, album });
        }

        Ok(Some(OrderWithDetails { order, details }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::shopping_cart::{NewOrder, ShoppingCartService};
    use crate::test_utils::{insert_album, test_db};
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_find_order_with_details() {
        let db = test_db().await;
        let album = insert_album(&db, "Thriller", 1499).await;
        let cart = ShoppingCartService::new(db.clone(), "bob");
        cart.add_to_cart(album.id).await.unwrap();
        cart.add_to_cart(album.id).await.unwrap();
        let order_id = cart.create_order(NewOrder::for_user("bob")).await.unwrap();

        let service = OrderService::new(db);
        let found = service.find_order(order_id, "bob").await.unwrap().unwrap();

        assert_eq!(found.order.id, order_id);
        assert_eq!(found.order.total_amount(), Decimal::new(2998, 2));
        assert_eq!(found.details.len(), 1);
        assert_eq!(found.details[0].album.title, "Thriller");
        assert_eq!(found.details[0].detail.quantity, 2);
    }

    #[tokio::test]
    async fn test_find_order_of_other_user_is_hidden() {
        let db = test_db().await;
        let album = insert_album(&db, "Thriller", 1499).await;
        let cart = ShoppingCartService::new(db.clone(), "bob");
        cart.add_to_cart(album.id).await.unwrap();
        let order_id = cart.create_order(NewOrder::for_user("bob")).await.unwrap();

        let service = OrderService::new(db);
        assert!(service.find_order(order_id, "mallory").await.unwrap().is_none());
        assert!(service.find_order(order_id + 1, "bob").await.unwrap().is_none());
    }
}
