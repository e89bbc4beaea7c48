mod api;
mod config;
mod error;
mod helpers;

mod data_objects;

pub use api::SnapApi;
pub use config::{MidtransConfig, MIDTRANS_PRODUCTION_HOST, MIDTRANS_SANDBOX_HOST};
pub use data_objects::{
    CustomerDetails,
    ItemDetail,
    SnapCallbacks,
    SnapNotification,
    SnapTokenResponse,
    SnapTransactionRequest,
    TransactionDetails,
};
pub use error::MidtransApiError;
pub use helpers::{extract_order_ref, parse_gross_amount};
