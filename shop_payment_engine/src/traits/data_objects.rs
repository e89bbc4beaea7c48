use crate::db_types::{Order, Payment, StatusUpdate};

/// The outcome of applying one gateway notification.
#[derive(Debug, Clone)]
pub struct PaymentUpdateResult {
    /// The order after the transition.
    pub order: Order,
    /// The payment record as it now stands.
    pub payment: Payment,
    /// What the notification meant.
    pub update: StatusUpdate,
    /// Whether this particular notification put stock back on the shelf.
    pub restocked: bool,
}

impl PaymentUpdateResult {
    /// One-line summary for webhook responses and logs.
    pub fn message(&self) -> String {
        match &self.update {
            StatusUpdate::Paid => "Payment successful".to_string(),
            StatusUpdate::Failed => "Payment failed or cancelled".to_string(),
            StatusUpdate::StillPending => "Payment pending".to_string(),
            StatusUpdate::NoChange(reason) => format!("Payment status unchanged: {reason}"),
        }
    }
}
