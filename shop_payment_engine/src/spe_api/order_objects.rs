//! Aggregates the engine hands back to callers. Everything here is fully materialised; handlers
//! serialise these types straight into API responses.

use serde::{Deserialize, Serialize};
use shop_common::Rupiah;

use crate::db_types::{Order, OrderItem, OrderStatus, Payment, PaymentStatus, Product};

/// An order item joined with the product it refers to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(flatten)]
    pub item: OrderItem,
    pub product: Product,
}

/// An order row plus every one of its items, each joined with its product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullOrder {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<LineItem>,
}

impl FullOrder {
    /// The sum of the item subtotals. Always equal to `order.total_amount` for an order the engine
    /// created.
    pub fn items_total(&self) -> Rupiah {
        self.items.iter().map(|line| line.item.subtotal).sum()
    }
}

/// What a successful checkout hands back: the order, the Snap token for the storefront's payment
/// widget, and the hosted page the customer can be redirected to instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResult {
    pub order: FullOrder,
    pub snap_token: String,
    pub redirect_url: String,
}

/// Projection served to customers polling for their payment outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentStatusSummary {
    pub order_id: i64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub snap_token: Option<String>,
    /// The gateway's latest word on this order, if it has said anything yet.
    pub payment: Option<Payment>,
}
