use thiserror::Error;

use crate::{
    db_types::{CartItem, Order, PaymentStatus, PaymentUpdate},
    order_objects::FullOrder,
    traits::{data_objects::PaymentUpdateResult, PaymentSessionError, StoreQueryError, StoreQueries},
};

/// This trait defines the highest level of behaviour for storage backends supporting the engine.
///
/// This behaviour includes:
/// * Reserving stock and creating orders as a single atomic step.
/// * Undoing a checkout whose payment session never materialised.
/// * Applying asynchronous gateway notifications to order, payment and stock state.
#[allow(async_fn_in_trait)]
pub trait CheckoutDatabase: Clone + StoreQueries {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Takes a validated cart and, in a single atomic transaction:
    /// * checks every product exists and carries enough stock,
    /// * decrements stock with a guarded update (`stock = stock - n WHERE stock >= n`), never
    ///   read-then-write,
    /// * creates the order (`Pending` / `Unpaid`) and one item row per cart line, with the unit price
    ///   frozen and `subtotal = price * quantity`.
    ///
    /// Either every line is reserved or the transaction rolls back with nothing taken. The order total
    /// is the sum of the item subtotals.
    async fn create_order_with_reservation(
        &self,
        user_id: i64,
        cart: &[CartItem],
    ) -> Result<FullOrder, CheckoutError>;

    /// Stores a gateway token on the order and returns the updated record.
    async fn attach_snap_token(&self, order_id: i64, token: &str) -> Result<Order, CheckoutError>;

    /// Undoes a checkout: puts every reserved item back on the shelf and deletes the order and its
    /// items.
    ///
    /// Restocking is best effort, line by line; a line that fails to restore is logged and skipped so
    /// the remaining lines still make it back. Deleting the order is not optional, and failing to do so
    /// is an error.
    async fn unwind_checkout(&self, order: &FullOrder) -> Result<(), CheckoutError>;

    /// Applies one normalised gateway notification in a single transaction:
    /// * upserts the payment record keyed on `order_id` (one row per order, last write wins),
    /// * transitions the order according to [`crate::db_types::StatusUpdate::derive`],
    /// * when the payment has died, restores the order's stock, but only if the order was not already
    ///   `Cancelled`. Replaying a failure notification therefore restocks exactly once.
    ///
    /// Returns what was done, for logging and the webhook response.
    async fn apply_payment_update(&self, update: &PaymentUpdate) -> Result<PaymentUpdateResult, CheckoutError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), CheckoutError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum CheckoutError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
    #[error("Product {0} does not exist")]
    ProductNotFound(i64),
    #[error("Insufficient stock for product: {name}")]
    InsufficientStock { name: String, requested: i64, in_stock: i64 },
    #[error("User {0} does not exist")]
    UserNotFound(i64),
    #[error("Order {0} does not exist")]
    OrderNotFound(i64),
    #[error("Order {id} can no longer be paid (payment status is {payment_status})")]
    OrderNotPayable { id: i64, payment_status: PaymentStatus },
    #[error("Could not create a payment session: {0}")]
    PaymentSession(#[from] PaymentSessionError),
    #[error("{0}")]
    QueryError(#[from] StoreQueryError),
}

impl From<sqlx::Error> for CheckoutError {
    fn from(e: sqlx::Error) -> Self {
        CheckoutError::DatabaseError(e.to_string())
    }
}
