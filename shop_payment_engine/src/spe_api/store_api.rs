use crate::{
    db_types::Product,
    order_objects::{FullOrder, PaymentStatusSummary},
    traits::{StoreQueries, StoreQueryError},
};

/// Read-only storefront queries.
///
/// Every order lookup is scoped to its owner. An order that exists but belongs to another customer is
/// reported exactly like one that does not exist at all.
pub struct StoreApi<B> {
    db: B,
}

impl<B> StoreApi<B>
where B: StoreQueries
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn products(&self) -> Result<Vec<Product>, StoreQueryError> {
        self.db.fetch_products().await
    }

    pub async fn product_by_id(&self, product_id: i64) -> Result<Option<Product>, StoreQueryError> {
        self.db.fetch_product_by_id(product_id).await
    }

    /// All of the user's orders, most recent first, with items and products.
    pub async fn orders_for_user(&self, user_id: i64) -> Result<Vec<FullOrder>, StoreQueryError> {
        self.db.fetch_orders_for_user(user_id).await
    }

    pub async fn order_for_user(&self, user_id: i64, order_id: i64) -> Result<Option<FullOrder>, StoreQueryError> {
        self.db.fetch_order_for_user(user_id, order_id).await
    }

    /// The payment view of one of the user's orders: current statuses, the Snap token if any, and the
    /// gateway's latest payment record.
    pub async fn payment_status(
        &self,
        user_id: i64,
        order_id: i64,
    ) -> Result<Option<PaymentStatusSummary>, StoreQueryError> {
        let order = match self.db.fetch_order_for_user(user_id, order_id).await? {
            Some(full) => full.order,
            None => return Ok(None),
        };
        let payment = self.db.fetch_payment_for_order(order_id).await?;
        Ok(Some(PaymentStatusSummary {
            order_id,
            status: order.status,
            payment_status: order.payment_status,
            snap_token: order.snap_token,
            payment,
        }))
    }
}
