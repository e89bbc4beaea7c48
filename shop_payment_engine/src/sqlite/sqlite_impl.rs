//! `SqliteDatabase` is a concrete implementation of a Shop Payment engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
use std::fmt::Debug;

use log::*;
use shop_common::Rupiah;
use sqlx::SqlitePool;

use super::db::{db_url, new_pool, orders, payments, products, users};
use crate::{
    db_types::{CartItem, Order, OrderStatus, Payment, PaymentStatus, PaymentUpdate, Product, StatusUpdate, User},
    order_objects::{FullOrder, LineItem},
    traits::{CheckoutDatabase, CheckoutError, PaymentUpdateResult, StoreQueries, StoreQueryError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteDatabase").field("url", &self.url).finish()
    }
}

impl SqliteDatabase {
    /// Creates a new connection pool using the URL from the `SPS_DATABASE_URL` environment variable, or the
    /// default if it is not set.
    ///
    /// Note: [`SqliteDatabase::new`] does not run migrations. The database is assumed to exist and be up to date.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl StoreQueries for SqliteDatabase {
    async fn fetch_products(&self) -> Result<Vec<Product>, StoreQueryError> {
        let mut conn = self.pool.acquire().await?;
        let products = products::fetch_products(&mut conn).await?;
        Ok(products)
    }

    async fn fetch_product_by_id(&self, product_id: i64) -> Result<Option<Product>, StoreQueryError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::fetch_product_by_id(product_id, &mut conn).await?;
        Ok(product)
    }

    async fn fetch_user_by_id(&self, user_id: i64) -> Result<Option<User>, StoreQueryError> {
        let mut conn = self.pool.acquire().await?;
        let user = users::fetch_user_by_id(user_id, &mut conn).await?;
        Ok(user)
    }

    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<FullOrder>, StoreQueryError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_full_orders_for_user(user_id, &mut conn).await
    }

    async fn fetch_order_for_user(&self, user_id: i64, order_id: i64) -> Result<Option<FullOrder>, StoreQueryError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_full_order_for_user(user_id, order_id, &mut conn).await
    }

    async fn fetch_payment_for_order(&self, order_id: i64) -> Result<Option<Payment>, StoreQueryError> {
        let mut conn = self.pool.acquire().await?;
        let payment = payments::fetch_payment_for_order(order_id, &mut conn).await?;
        Ok(payment)
    }
}

impl CheckoutDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn create_order_with_reservation(
        &self,
        user_id: i64,
        cart: &[CartItem],
    ) -> Result<FullOrder, CheckoutError> {
        let mut tx = self.pool.begin().await?;
        let mut total = Rupiah::from(0);
        let mut reserved = Vec::with_capacity(cart.len());
        for line in cart {
            let product = products::fetch_product_by_id(line.product_id, &mut tx)
                .await?
                .ok_or(CheckoutError::ProductNotFound(line.product_id))?;
            let taken = products::reserve_stock(line.product_id, line.quantity, &mut tx).await?;
            if !taken {
                debug!(
                    "🗃️ Not enough '{}' in stock ({} requested, {} available). The checkout rolls back with \
                     nothing reserved",
                    product.name, line.quantity, product.stock
                );
                return Err(CheckoutError::InsufficientStock {
                    name: product.name,
                    requested: line.quantity,
                    in_stock: product.stock,
                });
            }
            total += product.price * line.quantity;
            reserved.push(product);
        }
        let order = orders::insert_order(user_id, total, &mut tx).await?;
        let mut items = Vec::with_capacity(cart.len());
        for (line, product) in cart.iter().zip(reserved) {
            let item = orders::insert_order_item(order.id, product.id, line.quantity, product.price, &mut tx).await?;
            items.push(LineItem { item, product });
        }
        tx.commit().await?;
        debug!("🗃️ Order #{} created with {} line(s), totalling {}", order.id, items.len(), order.total_amount);
        Ok(FullOrder { order, items })
    }

    async fn attach_snap_token(&self, order_id: i64, token: &str) -> Result<Order, CheckoutError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::attach_snap_token(order_id, token, &mut conn)
            .await?
            .ok_or(CheckoutError::OrderNotFound(order_id))?;
        trace!("🗃️ Payment session token stored on order #{order_id}");
        Ok(order)
    }

    async fn unwind_checkout(&self, order: &FullOrder) -> Result<(), CheckoutError> {
        let order_id = order.order.id;
        let mut conn = self.pool.acquire().await?;
        for line in &order.items {
            if let Err(e) = products::restore_stock(line.item.product_id, line.item.quantity, &mut conn).await {
                error!(
                    "🗃️ Could not return {} unit(s) of product {} to the shelf while unwinding order #{order_id}: \
                     {e}",
                    line.item.quantity, line.item.product_id
                );
            }
        }
        orders::delete_order(order_id, &mut conn).await?;
        debug!("🗃️ Order #{order_id} has been unwound");
        Ok(())
    }

    async fn apply_payment_update(&self, update: &PaymentUpdate) -> Result<PaymentUpdateResult, CheckoutError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::fetch_order_by_id(update.order_id, &mut tx)
            .await?
            .ok_or(CheckoutError::OrderNotFound(update.order_id))?;
        let payment = payments::upsert_payment(update, &mut tx).await?;
        let status_update = update.status_update();
        let mut restocked = false;
        let order = match &status_update {
            StatusUpdate::Paid => {
                orders::set_order_state(order.id, OrderStatus::Processing, PaymentStatus::Paid, &mut tx).await?
            },
            StatusUpdate::Failed => {
                // An order that is already Cancelled had its stock returned when it was cancelled, so a
                // replayed failure notification must not return it again.
                if order.status != OrderStatus::Cancelled {
                    let items = orders::fetch_items_for_order(order.id, &mut tx).await?;
                    for item in &items {
                        products::restore_stock(item.product_id, item.quantity, &mut tx).await?;
                    }
                    restocked = !items.is_empty();
                }
                orders::set_order_state(order.id, OrderStatus::Cancelled, PaymentStatus::Failed, &mut tx).await?
            },
            StatusUpdate::StillPending => {
                orders::set_order_state(order.id, order.status, PaymentStatus::Pending, &mut tx).await?
            },
            StatusUpdate::NoChange(_) => order,
        };
        tx.commit().await?;
        trace!("🗃️ Payment update for order #{} applied ({})", order.id, update.status);
        Ok(PaymentUpdateResult { order, payment, update: status_update, restocked })
    }
}
