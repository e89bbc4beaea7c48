use shop_common::Rupiah;
use thiserror::Error;

/// A request for a gateway-hosted payment session.
#[derive(Debug, Clone)]
pub struct SessionRequest {
    /// The local order id. Gateway adapters use this to build the browser callback URLs.
    pub order_id: i64,
    /// The reference sent to the gateway. Usually the order id as a string; replacement sessions for
    /// an existing order append `-{unix_time}` because gateways reject a reference they have already
    /// seen.
    pub order_ref: String,
    pub gross_amount: Rupiah,
    pub customer_name: String,
    pub customer_email: String,
    pub items: Vec<SessionLineItem>,
}

#[derive(Debug, Clone)]
pub struct SessionLineItem {
    pub product_id: i64,
    pub name: String,
    pub price: Rupiah,
    pub quantity: i64,
}

/// A live payment session on the gateway: the token the storefront feeds to the payment widget, and
/// the hosted page customers can be sent to directly.
#[derive(Debug, Clone)]
pub struct PaymentSession {
    pub token: String,
    pub redirect_url: String,
}

#[derive(Debug, Clone, Error)]
pub enum PaymentSessionError {
    #[error("The payment gateway rejected the request: {0}")]
    Rejected(String),
    #[error("The payment gateway could not be reached: {0}")]
    Unreachable(String),
    #[error("The payment gateway did not respond in time")]
    Timeout,
    #[error("The payment gateway response was invalid: {0}")]
    InvalidResponse(String),
}

/// The seam between the engine and whichever payment gateway hosts the actual payment page.
#[allow(async_fn_in_trait)]
pub trait PaymentSessions {
    /// Asks the gateway to open a payment session for the given order.
    ///
    /// Implementations must bound the call in time and surface an overrun as
    /// [`PaymentSessionError::Timeout`]; the checkout flow treats a timeout like any other gateway
    /// failure and unwinds the reservation.
    async fn create_session(&self, request: &SessionRequest) -> Result<PaymentSession, PaymentSessionError>;
}
