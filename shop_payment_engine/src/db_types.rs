use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use shop_common::Rupiah;
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------    OrderStatus      ---------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderStatus {
    /// The order exists but the customer has not completed payment.
    Pending,
    /// Payment is in and the order is being prepared for shipment.
    Processing,
    /// The payment failed, expired or was cancelled. Stock has been returned to the shelf.
    Cancelled,
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "Pending"),
            OrderStatus::Processing => write!(f, "Processing"),
            OrderStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to Pending");
            OrderStatus::Pending
        })
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid status value: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Processing" => Ok(Self::Processing),
            "Cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------   PaymentStatus     ---------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum PaymentStatus {
    /// No payment attempt has reached us yet.
    Unpaid,
    /// The gateway confirmed the funds.
    Paid,
    /// The customer started a payment that has not settled yet.
    Pending,
    /// The payment was cancelled, denied or expired.
    Failed,
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Unpaid => write!(f, "Unpaid"),
            PaymentStatus::Paid => write!(f, "Paid"),
            PaymentStatus::Pending => write!(f, "Pending"),
            PaymentStatus::Failed => write!(f, "Failed"),
        }
    }
}

impl From<String> for PaymentStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid payment status: {value}. But this conversion cannot fail. Defaulting to Unpaid");
            PaymentStatus::Unpaid
        })
    }
}

impl FromStr for PaymentStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Unpaid" => Ok(Self::Unpaid),
            "Paid" => Ok(Self::Paid),
            "Pending" => Ok(Self::Pending),
            "Failed" => Ok(Self::Failed),
            s => Err(ConversionError(format!("Invalid payment status: {s}"))),
        }
    }
}

//-------------------------------------- TransactionStatus   ---------------------------------------------------------

/// The gateway's own vocabulary for the state of a payment attempt. Parsing never fails; statuses this
/// version doesn't know about are carried in `Other` so they can be logged verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    Capture,
    Settlement,
    Pending,
    Cancel,
    Deny,
    Expire,
    Other(String),
}

impl From<&str> for TransactionStatus {
    fn from(value: &str) -> Self {
        match value {
            "capture" => Self::Capture,
            "settlement" => Self::Settlement,
            "pending" => Self::Pending,
            "cancel" => Self::Cancel,
            "deny" => Self::Deny,
            "expire" => Self::Expire,
            s => Self::Other(s.to_string()),
        }
    }
}

impl Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionStatus::Capture => write!(f, "capture"),
            TransactionStatus::Settlement => write!(f, "settlement"),
            TransactionStatus::Pending => write!(f, "pending"),
            TransactionStatus::Cancel => write!(f, "cancel"),
            TransactionStatus::Deny => write!(f, "deny"),
            TransactionStatus::Expire => write!(f, "expire"),
            TransactionStatus::Other(s) => write!(f, "{s}"),
        }
    }
}

//--------------------------------------    FraudStatus      ---------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FraudStatus {
    Accept,
    Challenge,
    Other(String),
}

impl From<&str> for FraudStatus {
    fn from(value: &str) -> Self {
        match value {
            "accept" => Self::Accept,
            "challenge" => Self::Challenge,
            s => Self::Other(s.to_string()),
        }
    }
}

impl Display for FraudStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FraudStatus::Accept => write!(f, "accept"),
            FraudStatus::Challenge => write!(f, "challenge"),
            FraudStatus::Other(s) => write!(f, "{s}"),
        }
    }
}

//--------------------------------------    StatusUpdate     ---------------------------------------------------------

/// What a gateway notification does to an order.
///
/// The full decision table:
///
/// | transaction_status     | fraud_status | result                          |
/// |------------------------|--------------|---------------------------------|
/// | capture, settlement    | accept       | `Paid`                          |
/// | capture, settlement    | anything else| `NoChange` (flagged capture)    |
/// | cancel, deny, expire   | any          | `Failed`                        |
/// | pending                | any          | `StillPending`                  |
/// | anything else          | any          | `NoChange` (unknown status)     |
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    /// Funds are confirmed. The order moves to `Processing`.
    Paid,
    /// The payment attempt is dead. The order is cancelled and its stock goes back on the shelf.
    Failed,
    /// The customer has not completed payment. Only the payment status changes.
    StillPending,
    /// Nothing to do; the reason is carried for the logs.
    NoChange(String),
}

impl StatusUpdate {
    pub fn derive(status: &TransactionStatus, fraud: &FraudStatus) -> Self {
        use TransactionStatus::*;
        match status {
            Capture | Settlement => match fraud {
                FraudStatus::Accept => Self::Paid,
                flagged => Self::NoChange(format!("capture held back by fraud status '{flagged}'")),
            },
            Cancel | Deny | Expire => Self::Failed,
            Pending => Self::StillPending,
            Other(s) => Self::NoChange(format!("unknown transaction status '{s}'")),
        }
    }
}

//--------------------------------------      Product        ---------------------------------------------------------

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: Rupiah,
    pub stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------        User         ---------------------------------------------------------

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------       Order         ---------------------------------------------------------

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub total_amount: Rupiah,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    /// Token for the gateway's hosted payment page, once one has been issued.
    pub snap_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------     OrderItem       ---------------------------------------------------------

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    /// Unit price at the moment of purchase. The catalog price may drift afterwards; this one is frozen.
    pub price: Rupiah,
    pub subtotal: Rupiah,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------      CartItem       ---------------------------------------------------------

/// One line of a checkout request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: i64,
    pub quantity: i64,
}

//--------------------------------------      Payment        ---------------------------------------------------------

/// The gateway's view of an order's payment. One row per order; each notification overwrites the last.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub order_id: i64,
    pub payment_method: String,
    pub amount: Rupiah,
    pub transaction_id: String,
    /// Raw gateway status string, stored exactly as received.
    pub status: String,
    /// Verbatim notification payload, kept for auditing.
    pub response: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------   PaymentUpdate     ---------------------------------------------------------

/// A gateway notification normalised into the engine's vocabulary, ready to apply to an order.
#[derive(Debug, Clone)]
pub struct PaymentUpdate {
    pub order_id: i64,
    pub payment_method: String,
    pub amount: Rupiah,
    pub transaction_id: String,
    pub status: TransactionStatus,
    pub fraud_status: FraudStatus,
    /// The notification body exactly as it arrived, persisted with the payment record.
    pub raw: String,
}

impl PaymentUpdate {
    pub fn status_update(&self) -> StatusUpdate {
        StatusUpdate::derive(&self.status, &self.fraud_status)
    }
}
