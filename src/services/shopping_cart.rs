use std::sync::Arc;

use chrono::Utc;
use color_eyre::eyre::{Context, OptionExt, Result};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, SqlErr, TransactionTrait,
};
use tracing::instrument;
use uuid::Uuid;

use crate::database::{Database, SingleRow};
use crate::entities::{self, cents_to_decimal};
use crate::session::RequestContext;

/// Session key holding the cart identity.
pub const CART_SESSION_KEY: &str = "CartId";

#[derive(Debug, thiserror::Error)]
pub enum CartError {
    #[error("Album {0} not found")]
    AlbumNotFound(i64),
    #[error("Cart item {record_id} not found in cart {cart_id}")]
    LineItemNotFound { cart_id: String, record_id: i64 },
    #[error("Cart {cart_id} holds {count} rows where one was expected")]
    DuplicateLineItems { cart_id: String, count: usize },
    #[error("Cart {0} is empty")]
    EmptyCart(String),
}

/// A cart line item joined with its album.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub item: entities::cart::Model,
    pub album: entities::album::Model,
}

impl CartLine {
    fn line_total_cents(&self) -> i64 {
        i64::from(self.item.count) * self.album.price
    }

    pub fn line_total(&self) -> Decimal {
        cents_to_decimal(self.line_total_cents())
    }
}

/// Customer details collected at checkout. The total is never taken from input.
#[derive(Debug, Clone, Default)]
pub struct NewOrder {
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
}

#[cfg(test)]
impl NewOrder {
    pub fn for_user(username: &str) -> Self {
        Self {
            username: username.to_string(),
            first_name: "Test".into(),
            last_name: "Buyer".into(),
            email: format!("{}@example.com", username),
            ..Default::default()
        }
    }
}

/// Resolve the cart identity for a request.
///
/// Reuses the identity stored in the session; otherwise adopts the
/// authenticated user name, or generates a fresh UUID. The chosen identity is
/// written back to the session.
pub fn resolve_cart_id(ctx: &RequestContext) -> String {
    if let Some(cart_id) = ctx.session.get(CART_SESSION_KEY) {
        return cart_id;
    }

    let cart_id = match ctx.user_name() {
        Some(user_name) => user_name.to_string(),
        None => Uuid::new_v4().to_string(),
    };
    log::debug!("Assigned cart identity {}", cart_id);
    ctx.session.insert(CART_SESSION_KEY, cart_id.clone());
    cart_id
}

pub struct ShoppingCartService {
    db: Arc<Database>,
    cart_id: String,
}

impl ShoppingCartService {
    pub fn new(db: Arc<Database>, cart_id: impl Into<String>) -> Self {
        Self {
            db,
            cart_id: cart_id.into(),
        }
    }

    pub fn for_request(db: Arc<Database>, ctx: &RequestContext) -> Self {
        Self::new(db, resolve_cart_id(ctx))
    }

    pub fn cart_id(&self) -> &str {
        &self.cart_id
    }

    async fn find_line_item<C: ConnectionTrait>(
        conn: &C,
        cart_id: &str,
        album_id: i64,
    ) -> Result<Option<entities::cart::Model>> {
        let rows = entities::cart::Entity::find()
            .filter(entities::cart::Column::CartId.eq(cart_id))
            .filter(entities::cart::Column::AlbumId.eq(album_id))
            .all(conn)
            .await
            .context("Failed to query cart item")?;

        match SingleRow::from_rows(rows) {
            SingleRow::NotFound => Ok(None),
            SingleRow::One(item) => Ok(Some(item)),
            SingleRow::Many(count) => Err(CartError::DuplicateLineItems {
                cart_id: cart_id.to_string(),
                count,
            }
            .into()),
        }
    }

    async fn load_lines<C: ConnectionTrait>(conn: &C, cart_id: &str) -> Result<Vec<CartLine>> {
        let rows = entities::cart::Entity::find()
            .filter(entities::cart::Column::CartId.eq(cart_id))
            .order_by_asc(entities::cart::Column::RecordId)
            .find_also_related(entities::album::Entity)
            .all(conn)
            .await
            .context("Failed to fetch cart items")?;

        rows.into_iter()
            .map(|(item, album)| -> Result<CartLine> {
                let album = album.ok_or_eyre(format!(
                    "Cart item {} has no associated album",
                    item.record_id
                ))?;
                Ok(CartLine { item, album })
            })
            .collect()
    }

    async fn increment<C: ConnectionTrait>(
        conn: &C,
        item: entities::cart::Model,
    ) -> Result<entities::cart::Model> {
        let count = item.count + 1;
        let mut active: entities::cart::ActiveModel = item.into();
        active.count = Set(count);
        active
            .update(conn)
            .await
            .context("Failed to update cart item")
    }

    /// Insert a new line item. Losing an insert race against another request
    /// for the same album hits the unique index; the winner's row is then
    /// incremented instead.
    async fn insert_line_item<C: ConnectionTrait>(
        conn: &C,
        cart_id: &str,
        album_id: i64,
    ) -> Result<entities::cart::Model> {
        let inserted = entities::cart::ActiveModel {
            cart_id: Set(cart_id.to_string()),
            album_id: Set(album_id),
            count: Set(1),
            date_created: Set(Utc::now()),
            ..Default::default()
        }
        .insert(conn)
        .await;

        match inserted {
            Ok(item) => Ok(item),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                log::debug!(
                    "Cart {}: album {} was added concurrently, incrementing",
                    cart_id,
                    album_id
                );
                let item = Self::find_line_item(conn, cart_id, album_id)
                    .await?
                    .ok_or_eyre(format!(
                        "Cart {} has no row for album {} after a conflicting insert",
                        cart_id, album_id
                    ))?;
                Self::increment(conn, item).await
            }
            Err(e) => Err(e).context("Failed to insert cart item"),
        }
    }

    /// Add one copy of an album, creating the line item on first add.
    pub async fn add_to_cart(&self, album_id: i64) -> Result<entities::cart::Model> {
        entities::album::Entity::find_by_id(album_id)
            .one(&self.db.conn)
            .await
            .context("Failed to fetch album")?
            .ok_or(CartError::AlbumNotFound(album_id))?;

        let item = match Self::find_line_item(&self.db.conn, &self.cart_id, album_id).await? {
            Some(item) => Self::increment(&self.db.conn, item).await?,
            None => Self::insert_line_item(&self.db.conn, &self.cart_id, album_id).await?,
        };

        log::info!(
            "Cart {}: album {} quantity now {}",
            self.cart_id,
            album_id,
            item.count
        );
        Ok(item)
    }

    /// Remove one copy of a line item. Returns the remaining quantity, 0 once the row is gone.
    pub async fn remove_from_cart(&self, record_id: i64) -> Result<i32> {
        let rows = entities::cart::Entity::find()
            .filter(entities::cart::Column::CartId.eq(self.cart_id.as_str()))
            .filter(entities::cart::Column::RecordId.eq(record_id))
            .all(&self.db.conn)
            .await
            .context("Failed to query cart item")?;

        let item = match SingleRow::from_rows(rows) {
            SingleRow::One(item) => item,
            SingleRow::NotFound => {
                return Err(CartError::LineItemNotFound {
                    cart_id: self.cart_id.clone(),
                    record_id,
                }
                .into());
            }
            SingleRow::Many(count) => {
                return Err(CartError::DuplicateLineItems {
                    cart_id: self.cart_id.clone(),
                    count,
                }
                .into());
            }
        };

        if item.count > 1 {
            let count = item.count - 1;
            let mut active: entities::cart::ActiveModel = item.into();
            active.count = Set(count);
            active
                .update(&self.db.conn)
                .await
                .context("Failed to update cart item")?;
            log::info!("Cart {}: record {} quantity now {}", self.cart_id, record_id, count);
            Ok(count)
        } else {
            entities::cart::Entity::delete_by_id(item.record_id)
                .exec(&self.db.conn)
                .await
                .context("Failed to delete cart item")?;
            log::info!("Cart {}: record {} removed", self.cart_id, record_id);
            Ok(0)
        }
    }

    /// Delete every line item in the cart. Returns the number of rows removed.
    pub async fn empty_cart(&self) -> Result<u64> {
        let result = entities::cart::Entity::delete_many()
            .filter(entities::cart::Column::CartId.eq(self.cart_id.as_str()))
            .exec(&self.db.conn)
            .await
            .context("Failed to empty cart")?;
        log::info!(
            "Cart {}: emptied ({} rows)",
            self.cart_id,
            result.rows_affected
        );
        Ok(result.rows_affected)
    }

    pub async fn get_cart_items(&self) -> Result<Vec<CartLine>> {
        Self::load_lines(&self.db.conn, &self.cart_id).await
    }

    /// Total number of album copies in the cart.
    pub async fn get_count(&self) -> Result<i64> {
        let count: Option<Option<i64>> = entities::cart::Entity::find()
            .select_only()
            .column_as(entities::cart::Column::Count.sum(), "count")
            .filter(entities::cart::Column::CartId.eq(self.cart_id.as_str()))
            .into_tuple()
            .one(&self.db.conn)
            .await
            .context("Failed to count cart items")?;

        Ok(count.flatten().unwrap_or(0))
    }

    /// Sum of quantity times current album price.
    pub async fn get_total(&self) -> Result<Decimal> {
        let lines = self.get_cart_items().await?;
        Ok(cents_to_decimal(
            lines.iter().map(CartLine::line_total_cents).sum(),
        ))
    }

    /// Turn the cart into an order and empty it. Returns the order id.
    ///
    /// Order, order details and the cart deletion commit together.
    #[instrument(skip(self, new_order), fields(cart_id = %self.cart_id))]
    pub async fn create_order(&self, new_order: NewOrder) -> Result<i64> {
        let txn = self
            .db
            .conn
            .begin()
            .await
            .context("Failed to start checkout transaction")?;

        let lines = Self::load_lines(&txn, &self.cart_id).await?;
        if lines.is_empty() {
            return Err(CartError::EmptyCart(self.cart_id.clone()).into());
        }

        let mut total = 0i64;
        for line in &lines {
            total += line.line_total_cents();
        }

        let order = entities::order::ActiveModel {
            order_date: Set(Utc::now()),
            username: Set(new_order.username),
            first_name: Set(new_order.first_name),
            last_name: Set(new_order.last_name),
            address: Set(new_order.address),
            city: Set(new_order.city),
            state: Set(new_order.state),
            postal_code: Set(new_order.postal_code),
            country: Set(new_order.country),
            phone: Set(new_order.phone),
            email: Set(new_order.email),
            total: Set(total),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to insert order")?;

        for line in &lines {
            entities::order_detail::ActiveModel {
                order_id: Set(order.id),
                album_id: Set(line.album.id),
                quantity: Set(line.item.count),
                unit_price: Set(line.album.price),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .context("Failed to insert order detail")?;
        }

        entities::cart::Entity::delete_many()
            .filter(entities::cart::Column::CartId.eq(self.cart_id.as_str()))
            .exec(&txn)
            .await
            .context("Failed to empty cart")?;

        txn.commit()
            .await
            .context("Failed to commit checkout transaction")?;

        log::info!(
            "Cart {}: order {} created ({} lines, total {})",
            self.cart_id,
            order.id,
            lines.len(),
            order.total_amount()
        );
        Ok(order.id)
    }

    /// Move this cart's items under `user_name` and point the session at it.
    ///
    /// An album already present in the named cart has the quantities summed
    /// into the named row. Returns the number of line items moved or merged.
    #[instrument(skip(self, ctx), fields(cart_id = %self.cart_id))]
    pub async fn migrate_cart(&mut self, ctx: &RequestContext, user_name: &str) -> Result<u64> {
        if user_name == self.cart_id {
            ctx.session.insert(CART_SESSION_KEY, user_name);
            return Ok(0);
        }

        let txn = self
            .db
            .conn
            .begin()
            .await
            .context("Failed to start cart migration")?;

        let items = entities::cart::Entity::find()
            .filter(entities::cart::Column::CartId.eq(self.cart_id.as_str()))
            .all(&txn)
            .await
            .context("Failed to fetch cart items")?;

        let mut migrated = 0u64;
        for item in items {
            match Self::find_line_item(&txn, user_name, item.album_id).await? {
                Some(named) => {
                    let count = named.count + item.count;
                    let mut active: entities::cart::ActiveModel = named.into();
                    active.count = Set(count);
                    active
                        .update(&txn)
                        .await
                        .context("Failed to merge cart item")?;
                    entities::cart::Entity::delete_by_id(item.record_id)
                        .exec(&txn)
                        .await
                        .context("Failed to delete merged cart item")?;
                }
                None => {
                    let mut active: entities::cart::ActiveModel = item.into();
                    active.cart_id = Set(user_name.to_string());
                    active
                        .update(&txn)
                        .await
                        .context("Failed to migrate cart item")?;
                }
            }
            migrated += 1;
        }

        txn.commit()
            .await
            .context("Failed to commit cart migration")?;

        log::info!(
            "Cart {}: migrated {} items to {}",
            self.cart_id,
            migrated,
            user_name
        );
        ctx.session.insert(CART_SESSION_KEY, user_name);
        self.cart_id = user_name.to_string();
        Ok(migrated)
    }
}
