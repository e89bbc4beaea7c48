//! Glue between the engine's gateway seam and the Midtrans Snap client.
//!
//! Outbound, [`SnapGateway`] implements [`PaymentSessions`] on top of [`SnapApi`]. Inbound,
//! [`payment_update_from_notification`] normalises a webhook body into the engine's
//! [`PaymentUpdate`], deciding which fields are required and which get fallbacks.

use log::*;
use midtrans_tools::{
    extract_order_ref,
    CustomerDetails,
    ItemDetail,
    MidtransApiError,
    MidtransConfig,
    SnapApi,
    SnapCallbacks,
    SnapNotification,
    SnapTransactionRequest,
};
use shop_payment_engine::{
    db_types::{FraudStatus, PaymentUpdate, TransactionStatus},
    PaymentSession,
    PaymentSessionError,
    PaymentSessions,
    SessionRequest,
};
use thiserror::Error;

#[derive(Clone)]
pub struct SnapGateway {
    api: SnapApi,
    app_url: String,
}

impl SnapGateway {
    pub fn new(config: MidtransConfig, app_url: &str) -> Result<Self, MidtransApiError> {
        let api = SnapApi::new(config)?;
        let app_url = app_url.trim_end_matches('/').to_string();
        Ok(Self { api, app_url })
    }
}

impl PaymentSessions for SnapGateway {
    async fn create_session(&self, request: &SessionRequest) -> Result<PaymentSession, PaymentSessionError> {
        trace!("Requesting a Snap session for order ref {}", request.order_ref);
        let customer = CustomerDetails {
            first_name: request.customer_name.clone(),
            email: request.customer_email.clone(),
        };
        let items = request
            .items
            .iter()
            .map(|line| ItemDetail {
                id: line.product_id.to_string(),
                price: line.price,
                quantity: line.quantity,
                name: line.name.clone(),
            })
            .collect();
        let order_id = request.order_id;
        let callbacks = SnapCallbacks {
            finish: format!("{}/payment/success/{order_id}", self.app_url),
            error: format!("{}/payment/failed/{order_id}", self.app_url),
            pending: format!("{}/payment/pending/{order_id}", self.app_url),
        };
        let snap_request =
            SnapTransactionRequest::new(request.order_ref.clone(), request.gross_amount, customer, items, callbacks);
        let response = self.api.create_transaction(&snap_request).await.map_err(|e| match e {
            MidtransApiError::Timeout => PaymentSessionError::Timeout,
            MidtransApiError::SnapError { status, message } => {
                PaymentSessionError::Rejected(format!("Error {status}. {message}"))
            },
            MidtransApiError::JsonError(m) => PaymentSessionError::InvalidResponse(m),
            e => PaymentSessionError::Unreachable(e.to_string()),
        })?;
        Ok(PaymentSession { token: response.token, redirect_url: response.redirect_url })
    }
}

#[derive(Debug, Clone, Error)]
pub enum NotificationConversionError {
    #[error("The notification is missing the {0} field")]
    MissingField(&'static str),
    #[error("'{0}' does not refer to an order on this server")]
    InvalidOrderRef(String),
}

/// Turns a raw Snap notification into the engine's normalised [`PaymentUpdate`].
///
/// `order_id` and `transaction_status` are required; everything else falls back to the defaults the
/// sandbox tolerates (`accept`, `manual`, a synthetic transaction id, zero amount). The order ref
/// may carry a `-{unix_time}` suffix from a regenerated token; only the numeric prefix counts. The
/// untouched body travels along in `raw` and is stored with the payment record.
pub fn payment_update_from_notification(
    notification: &SnapNotification,
    raw: String,
) -> Result<PaymentUpdate, NotificationConversionError> {
    let order_ref =
        notification.order_id.as_deref().ok_or(NotificationConversionError::MissingField("order_id"))?;
    let order_id = extract_order_ref(order_ref)
        .map_err(|_| NotificationConversionError::InvalidOrderRef(order_ref.to_string()))?;
    let status = notification
        .transaction_status
        .as_deref()
        .ok_or(NotificationConversionError::MissingField("transaction_status"))?;
    Ok(PaymentUpdate {
        order_id,
        payment_method: notification.payment_type_or_default().to_string(),
        amount: notification.gross_amount_or_default(),
        transaction_id: notification.transaction_id_or_default(),
        status: TransactionStatus::from(status),
        fraud_status: FraudStatus::from(notification.fraud_status_or_default()),
        raw,
    })
}
