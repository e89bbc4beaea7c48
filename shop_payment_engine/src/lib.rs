//! Shop Payment Engine
//!
//! The engine holds the core logic of the shop's order and payment subsystem. It is HTTP-agnostic and
//! gateway-agnostic; the server crate wires it to actix-web and to the Midtrans Snap client.
//!
//! The library is divided into three main sections:
//! 1. Database management and control ([`mod@sqlite`]). You should never need to access the database directly.
//!    Instead, use the public API provided by the engine. The exception is the data types used in the database,
//!    which are defined in the [`mod@db_types`] module and are public.
//! 2. The storage and gateway contracts ([`mod@traits`]). A backend implements [`CheckoutDatabase`] and
//!    [`StoreQueries`] to support the engine; a payment provider implements [`PaymentSessions`].
//! 3. The engine public API ([`CheckoutApi`], [`ReconciliationApi`], [`StoreApi`]). This is what the server
//!    calls: checkout with all-or-nothing stock reservation, asynchronous payment reconciliation, and
//!    customer-scoped queries.

pub mod db_types;

mod spe_api;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use spe_api::{
    checkout_api::CheckoutApi,
    order_objects,
    reconciliation_api::ReconciliationApi,
    store_api::StoreApi,
};
pub use traits::{
    CheckoutDatabase,
    CheckoutError,
    PaymentSession,
    PaymentSessionError,
    PaymentSessions,
    PaymentUpdateResult,
    SessionLineItem,
    SessionRequest,
    StoreQueries,
    StoreQueryError,
};
