use chrono::Utc;
use log::*;

use crate::{
    db_types::{CartItem, PaymentStatus, User},
    order_objects::{CheckoutResult, FullOrder},
    traits::{CheckoutDatabase, CheckoutError, PaymentSessions, SessionLineItem, SessionRequest},
};

/// The checkout workflow: reserve the cart, persist the order, then hand the amount over to the
/// payment gateway for collection.
///
/// `B` supplies storage and `G` supplies hosted payment sessions. The flow in full:
///
/// 1. The cart is reserved and the order created in **one** database transaction. Any line that cannot
///    be satisfied aborts the lot, so a failed checkout never strands partial stock.
/// 2. The gateway is asked for a payment session *after* the transaction commits. No database locks are
///    held while an external service deliberates, and the call is bounded in time.
/// 3. If the gateway fails (or times out), the checkout is unwound: stock returns to the shelf and the
///    order is deleted. The customer sees one error and can simply retry.
pub struct CheckoutApi<B, G> {
    db: B,
    gateway: G,
}

impl<B, G> CheckoutApi<B, G>
where
    B: CheckoutDatabase,
    G: PaymentSessions,
{
    pub fn new(db: B, gateway: G) -> Self {
        Self { db, gateway }
    }

    /// Turn a cart into a `Pending`/`Unpaid` order with a live payment session.
    pub async fn checkout(&self, user_id: i64, cart: &[CartItem]) -> Result<CheckoutResult, CheckoutError> {
        debug!("🛒️ Checkout for user {user_id} with {} cart line(s)", cart.len());
        let user = self.db.fetch_user_by_id(user_id).await?.ok_or(CheckoutError::UserNotFound(user_id))?;
        let order = self.db.create_order_with_reservation(user_id, cart).await?;
        let order_id = order.order.id;
        info!("🛒️ Order {order_id} created for {}. Requesting a payment session", order.order.total_amount);
        let request = session_request_for(&order, order_id.to_string(), &user);
        let session = match self.gateway.create_session(&request).await {
            Ok(session) => session,
            Err(e) => {
                warn!("🛒️ Payment session for order {order_id} failed ({e}). Unwinding the checkout");
                if let Err(db_err) = self.db.unwind_checkout(&order).await {
                    error!("🛒️ Could not fully unwind order {order_id}: {db_err}");
                } else {
                    info!("🛒️ Order {order_id} unwound and its stock returned");
                }
                return Err(CheckoutError::PaymentSession(e));
            },
        };
        let updated = self.db.attach_snap_token(order_id, &session.token).await?;
        info!("🛒️ Snap token attached to order {order_id}");
        let order = FullOrder { order: updated, items: order.items };
        Ok(CheckoutResult { order, snap_token: session.token, redirect_url: session.redirect_url })
    }

    /// Issue a fresh Snap token for an existing order.
    ///
    /// The gateway rejects an order reference it has already seen, so the replacement session is opened
    /// under `"{order_id}-{unix_time}"`; reconciliation strips the suffix when notifications come back.
    /// Only the order's owner can do this, and only while the order can still be paid.
    pub async fn regenerate_snap_token(&self, user_id: i64, order_id: i64) -> Result<CheckoutResult, CheckoutError> {
        let user = self.db.fetch_user_by_id(user_id).await?.ok_or(CheckoutError::UserNotFound(user_id))?;
        let order =
            self.db.fetch_order_for_user(user_id, order_id).await?.ok_or(CheckoutError::OrderNotFound(order_id))?;
        match order.order.payment_status {
            PaymentStatus::Unpaid | PaymentStatus::Pending => {},
            status => return Err(CheckoutError::OrderNotPayable { id: order_id, payment_status: status }),
        }
        let order_ref = format!("{order_id}-{}", Utc::now().timestamp());
        debug!("🛒️ Requesting a replacement payment session for order {order_id} as '{order_ref}'");
        let request = session_request_for(&order, order_ref, &user);
        let session = self.gateway.create_session(&request).await?;
        let updated = self.db.attach_snap_token(order_id, &session.token).await?;
        info!("🛒️ Replacement Snap token attached to order {order_id}");
        let order = FullOrder { order: updated, items: order.items };
        Ok(CheckoutResult { order, snap_token: session.token, redirect_url: session.redirect_url })
    }
}

fn session_request_for(order: &FullOrder, order_ref: String, user: &User) -> SessionRequest {
    let items = order
        .items
        .iter()
        .map(|line| SessionLineItem {
            product_id: line.item.product_id,
            name: line.product.name.clone(),
            price: line.item.price,
            quantity: line.item.quantity,
        })
        .collect();
    SessionRequest {
        order_id: order.order.id,
        order_ref,
        gross_amount: order.order.total_amount,
        customer_name: user.name.clone(),
        customer_email: user.email.clone(),
        items,
    }
}
