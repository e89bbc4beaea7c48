//! # Shop payment engine public API
//!
//! The `spe_api` module exposes the programmatic API for the engine. The API is modular, so that
//! clients can pick and choose the functionality they need.
//!
//! * [`checkout_api`] owns the money-critical write path: all-or-nothing stock reservation, order
//!   creation, payment session setup and the compensating unwind when the gateway lets us down.
//! * [`reconciliation_api`] digests asynchronous gateway notifications and converges local order,
//!   payment and stock state.
//! * [`store_api`] provides read-only, customer-scoped queries for the storefront.
//!
//! The pattern for using the APIs is the same everywhere: an API instance is created by supplying a
//! database backend (and, for checkout, a payment gateway) that implements the required traits.
//!
//! ```rust,ignore
//! use shop_payment_engine::{SqliteDatabase, StoreApi};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! // SqliteDatabase implements StoreQueries
//! let api = StoreApi::new(db);
//! let orders = api.orders_for_user(user_id).await?;
//! ```

pub mod checkout_api;
pub mod order_objects;
pub mod reconciliation_api;
pub mod store_api;
