use log::*;

use crate::{
    db_types::{PaymentUpdate, StatusUpdate},
    traits::{CheckoutDatabase, CheckoutError, PaymentUpdateResult},
};

/// Applies asynchronous gateway notifications to local state.
///
/// The gateway is the source of truth for payment outcomes and will happily deliver the same
/// notification more than once, out of order, or for statuses this code has never heard of. Everything
/// lands in a single database transaction per notification, and replays converge on the same state:
/// the payment row is simply overwritten and stock only returns to the shelf the first time an order
/// is cancelled.
pub struct ReconciliationApi<B> {
    db: B,
}

impl<B> ReconciliationApi<B>
where B: CheckoutDatabase
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Digest one gateway notification and return what was done.
    pub async fn process_update(&self, update: PaymentUpdate) -> Result<PaymentUpdateResult, CheckoutError> {
        debug!("💳️ Processing '{}' notification for order {}", update.status, update.order_id);
        let result = self.db.apply_payment_update(&update).await?;
        match &result.update {
            StatusUpdate::NoChange(reason) => {
                warn!("💳️ Order {} left as-is: {reason}", result.order.id);
            },
            _ => {
                info!(
                    "💳️ Order {} is now {} / {}{}",
                    result.order.id,
                    result.order.status,
                    result.order.payment_status,
                    if result.restocked { ". Stock was returned to the shelf" } else { "" }
                );
            },
        }
        Ok(result)
    }
}
