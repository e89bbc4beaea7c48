use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use shop_common::Rupiah;

use crate::helpers::parse_gross_amount;

//--------------------------------------   Snap transactions  --------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionDetails {
    /// The order reference as sent to the gateway. Not always the bare order
    /// id: regenerated tokens append `-{unix_time}` because Midtrans rejects
    /// a transaction for an order id it has already seen.
    pub order_id: String,
    pub gross_amount: Rupiah,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub first_name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDetail {
    pub id: String,
    pub price: Rupiah,
    pub quantity: i64,
    pub name: String,
}

/// Browser URLs Midtrans redirects the customer to when they leave the
/// hosted payment page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapCallbacks {
    pub finish: String,
    pub error: String,
    pub pending: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapTransactionRequest {
    pub transaction_details: TransactionDetails,
    pub customer_details: CustomerDetails,
    pub item_details: Vec<ItemDetail>,
    pub callbacks: SnapCallbacks,
}

impl SnapTransactionRequest {
    pub fn new(
        order_ref: String,
        gross_amount: Rupiah,
        customer: CustomerDetails,
        items: Vec<ItemDetail>,
        callbacks: SnapCallbacks,
    ) -> Self {
        Self {
            transaction_details: TransactionDetails { order_id: order_ref, gross_amount },
            customer_details: customer,
            item_details: items,
            callbacks,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapTokenResponse {
    pub token: String,
    pub redirect_url: String,
}

//--------------------------------------   Snap notifications  -------------------------------------------------------

/// The JSON document Midtrans POSTs to the payment notification URL.
///
/// Everything is optional at the wire level. Which fields are actually
/// required, and the fallback values for the rest, is decided where the
/// notification is turned into a payment update, so that a missing
/// `order_id` can be reported precisely instead of as a blanket parse error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapNotification {
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub transaction_status: Option<String>,
    #[serde(default)]
    pub fraud_status: Option<String>,
    #[serde(default, deserialize_with = "amount_as_string")]
    pub gross_amount: Option<String>,
    #[serde(default)]
    pub payment_type: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub transaction_time: Option<String>,
    #[serde(default)]
    pub status_code: Option<String>,
    #[serde(default)]
    pub signature_key: Option<String>,
}

impl SnapNotification {
    pub fn fraud_status_or_default(&self) -> &str {
        self.fraud_status.as_deref().unwrap_or("accept")
    }

    pub fn payment_type_or_default(&self) -> &str {
        self.payment_type.as_deref().unwrap_or("manual")
    }

    /// Sandbox test notifications sometimes omit the transaction id; a
    /// synthetic one keeps the payment record non-empty.
    pub fn transaction_id_or_default(&self) -> String {
        self.transaction_id.clone().unwrap_or_else(|| format!("test-{}", Utc::now().timestamp()))
    }

    pub fn gross_amount_or_default(&self) -> Rupiah {
        parse_gross_amount(self.gross_amount.as_deref())
    }
}

// Midtrans documents gross_amount as a decimal string, but test payloads are
// frequently hand-written with a bare number. Accept both.
fn amount_as_string<'de, D>(de: D) -> Result<Option<String>, D::Error>
where D: Deserializer<'de> {
    let value = Option::<Value>::deserialize(de)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }))
}
