//! Shortcuts for populating a test database with users and products.
//!
//! The storefront has no public write API for the catalogue, so tests reach past the engine and insert rows
//! through the low-level db helpers.
use shop_common::Rupiah;

use crate::{
    db_types::{Product, User},
    sqlite::db::{products, users},
    SqliteDatabase,
};

pub async fn seed_user(db: &SqliteDatabase, name: &str, email: &str) -> User {
    let mut conn = db.pool().acquire().await.expect("Error acquiring a connection");
    users::insert_user(name, email, &mut conn).await.expect("Error seeding user")
}

pub async fn seed_product(db: &SqliteDatabase, name: &str, price: i64, stock: i64) -> Product {
    let mut conn = db.pool().acquire().await.expect("Error acquiring a connection");
    products::insert_product(name, None, Rupiah::from(price), stock, &mut conn).await.expect("Error seeding product")
}
