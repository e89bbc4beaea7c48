//! # Shop Payment Server
//! This crate is the HTTP face of the shop's order and payment subsystem. It is responsible for:
//! * The authenticated storefront routes: checkout, order queries, payment status and Snap token
//!   regeneration.
//! * Listening for asynchronous payment notifications from Midtrans and feeding them to the engine.
//! * Public catalog reads and a health probe.
//!
//! The actual order, stock and payment logic lives in `shop_payment_engine`; this crate wires it to
//! actix-web, to the Midtrans Snap client in `midtrans_tools`, and to the operator's environment.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;

pub mod helpers;
pub mod integrations;
pub mod midtrans_routes;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
