//! # Storage and gateway contracts.
//!
//! This module defines the interface contracts the engine's *backends* must satisfy.
//!
//! ## Traits
//! * [`CheckoutDatabase`] defines the highest level of behaviour for storage backends: atomic all-or-nothing
//!   stock reservation, order creation, checkout unwinding and payment reconciliation.
//! * [`StoreQueries`] provides read-only queries for products, users, orders and payments. Order queries are
//!   always scoped to an owning user.
//! * [`PaymentSessions`] is the seam to the external payment gateway: given an order, produce a hosted
//!   payment session (token + redirect URL) within a bounded time.
//!
//! The engine's public API types ([`crate::CheckoutApi`] and friends) are generic over these traits, so a
//! Postgres backend or a different gateway can be swapped in without touching the flows.
mod checkout_database;
mod store_queries;

mod payment_sessions;

mod data_objects;

pub use checkout_database::{CheckoutDatabase, CheckoutError};
pub use data_objects::PaymentUpdateResult;
pub use payment_sessions::{PaymentSession, PaymentSessionError, PaymentSessions, SessionLineItem, SessionRequest};
pub use store_queries::{StoreQueries, StoreQueryError};
