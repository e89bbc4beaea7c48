use log::*;
use shop_common::Rupiah;
use sqlx::SqliteConnection;

use crate::db_types::Product;

pub async fn fetch_products(conn: &mut SqliteConnection) -> Result<Vec<Product>, sqlx::Error> {
    sqlx::query_as(r#"SELECT * FROM products ORDER BY id DESC"#).fetch_all(conn).await
}

pub async fn fetch_product_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as(r#"SELECT * FROM products WHERE id = $1"#).bind(id).fetch_optional(conn).await
}

/// Takes `quantity` units of the given product off the shelf, if and only if at least that many are available.
///
/// The availability check lives inside the `UPDATE` statement itself, so there is no window between checking the
/// stock level and decrementing it. Returns `true` if the stock was reserved, and `false` if the product had
/// fewer than `quantity` units left (in which case nothing was changed).
pub async fn reserve_stock(product_id: i64, quantity: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"UPDATE products SET stock = stock - $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 AND stock >= $1"#,
    )
    .bind(quantity)
    .bind(product_id)
    .execute(conn)
    .await?;
    let reserved = result.rows_affected() > 0;
    trace!("📦️ Reserving {quantity} unit(s) of product {product_id}: {}", if reserved { "ok" } else { "refused" });
    Ok(reserved)
}

/// Returns `quantity` units of the given product to the shelf.
pub async fn restore_stock(product_id: i64, quantity: i64, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    let result =
        sqlx::query(r#"UPDATE products SET stock = stock + $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2"#)
            .bind(quantity)
            .bind(product_id)
            .execute(conn)
            .await?;
    if result.rows_affected() == 0 {
        warn!("📦️ Tried to return {quantity} unit(s) to product {product_id}, but that product no longer exists");
    }
    Ok(())
}

pub async fn insert_product(
    name: &str,
    description: Option<&str>,
    price: Rupiah,
    stock: i64,
    conn: &mut SqliteConnection,
) -> Result<Product, sqlx::Error> {
    let product = sqlx::query_as(
        r#"
        INSERT INTO products (name, description, price, stock)
        VALUES ($1, $2, $3, $4)
        RETURNING *;
    "#,
    )
    .bind(name)
    .bind(description)
    .bind(price)
    .bind(stock)
    .fetch_one(conn)
    .await?;
    debug!("📦️ Product {name} added to the catalogue");
    Ok(product)
}
