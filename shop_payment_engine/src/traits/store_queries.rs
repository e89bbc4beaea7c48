use thiserror::Error;

use crate::{
    db_types::{Payment, Product, User},
    order_objects::FullOrder,
};

#[derive(Debug, Clone, Error)]
pub enum StoreQueryError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
    #[error("The database returned an inconsistent record set: {0}")]
    InconsistentState(String),
}

impl From<sqlx::Error> for StoreQueryError {
    fn from(e: sqlx::Error) -> Self {
        StoreQueryError::DatabaseError(e.to_string())
    }
}

/// Read-only storefront queries.
///
/// Order lookups take the owning `user_id` and only ever return that user's orders. Reconciliation,
/// which must resolve orders on behalf of the gateway without a user in sight, goes through
/// [`crate::traits::CheckoutDatabase`] instead.
#[allow(async_fn_in_trait)]
pub trait StoreQueries {
    /// Fetches the whole catalog, newest products first.
    async fn fetch_products(&self) -> Result<Vec<Product>, StoreQueryError>;

    /// Fetches a single product, or `None` if it does not exist.
    async fn fetch_product_by_id(&self, product_id: i64) -> Result<Option<Product>, StoreQueryError>;

    /// Fetches a user record, or `None` if it does not exist.
    async fn fetch_user_by_id(&self, user_id: i64) -> Result<Option<User>, StoreQueryError>;

    /// Fetches all orders belonging to `user_id`, most recent first, fully materialised with their
    /// items and products.
    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<FullOrder>, StoreQueryError>;

    /// Fetches one of `user_id`'s orders. Returns `None` both when the order does not exist and when
    /// it belongs to someone else; callers cannot tell the two apart.
    async fn fetch_order_for_user(&self, user_id: i64, order_id: i64) -> Result<Option<FullOrder>, StoreQueryError>;

    /// Fetches the payment record for an order, if the gateway has ever told us about one.
    async fn fetch_payment_for_order(&self, order_id: i64) -> Result<Option<Payment>, StoreQueryError>;
}
