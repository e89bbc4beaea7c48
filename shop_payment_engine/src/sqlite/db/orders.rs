use std::collections::HashMap;

use log::*;
use shop_common::Rupiah;
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{Order, OrderItem, OrderStatus, PaymentStatus, Product},
    order_objects::{FullOrder, LineItem},
    traits::StoreQueryError,
};

pub async fn insert_order(user_id: i64, total: Rupiah, conn: &mut SqliteConnection) -> Result<Order, sqlx::Error> {
    let order: Order = sqlx::query_as(
        r#"
        INSERT INTO orders (user_id, total_amount, status, payment_status)
        VALUES ($1, $2, $3, $4)
        RETURNING *;
    "#,
    )
    .bind(user_id)
    .bind(total)
    .bind(OrderStatus::Pending)
    .bind(PaymentStatus::Unpaid)
    .fetch_one(conn)
    .await?;
    debug!("📝️ Order #{} created for user {user_id}", order.id);
    Ok(order)
}

/// Records one line of an order. The unit price is snapshotted from the product at the time of purchase, so later
/// price changes never affect existing orders.
pub async fn insert_order_item(
    order_id: i64,
    product_id: i64,
    quantity: i64,
    price: Rupiah,
    conn: &mut SqliteConnection,
) -> Result<OrderItem, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO order_items (order_id, product_id, quantity, price, subtotal)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *;
    "#,
    )
    .bind(order_id)
    .bind(product_id)
    .bind(quantity)
    .bind(price)
    .bind(price * quantity)
    .fetch_one(conn)
    .await
}

pub async fn fetch_order_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as(r#"SELECT * FROM orders WHERE id = $1"#).bind(id).fetch_optional(conn).await
}

pub async fn fetch_order_for_user(
    user_id: i64,
    order_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as(r#"SELECT * FROM orders WHERE id = $1 AND user_id = $2"#)
        .bind(order_id)
        .bind(user_id)
        .fetch_optional(conn)
        .await
}

pub async fn fetch_orders_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    sqlx::query_as(r#"SELECT * FROM orders WHERE user_id = $1 ORDER BY id DESC"#)
        .bind(user_id)
        .fetch_all(conn)
        .await
}

pub async fn fetch_items_for_order(
    order_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<OrderItem>, sqlx::Error> {
    sqlx::query_as(r#"SELECT * FROM order_items WHERE order_id = $1 ORDER BY id"#)
        .bind(order_id)
        .fetch_all(conn)
        .await
}

/// Loads the line items for an order together with the product each line refers to.
pub async fn fetch_line_items(
    order_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<LineItem>, StoreQueryError> {
    let items = fetch_items_for_order(order_id, conn).await?;
    if items.is_empty() {
        return Ok(Vec::new());
    }
    let mut query = QueryBuilder::new("SELECT * FROM products WHERE id IN (");
    let mut ids = query.separated(", ");
    for item in &items {
        ids.push_bind(item.product_id);
    }
    query.push(")");
    let products: Vec<Product> = query.build_query_as().fetch_all(&mut *conn).await?;
    let products: HashMap<i64, Product> = products.into_iter().map(|p| (p.id, p)).collect();
    items
        .into_iter()
        .map(|item| {
            let product = products.get(&item.product_id).cloned().ok_or_else(|| {
                StoreQueryError::InconsistentState(format!(
                    "Order item {} refers to product {}, which does not exist",
                    item.id, item.product_id
                ))
            })?;
            Ok(LineItem { item, product })
        })
        .collect()
}

pub async fn fetch_full_order(
    order_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<FullOrder>, StoreQueryError> {
    let Some(order) = fetch_order_by_id(order_id, conn).await? else {
        return Ok(None);
    };
    let items = fetch_line_items(order_id, conn).await?;
    Ok(Some(FullOrder { order, items }))
}

pub async fn fetch_full_order_for_user(
    user_id: i64,
    order_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<FullOrder>, StoreQueryError> {
    let Some(order) = fetch_order_for_user(user_id, order_id, conn).await? else {
        return Ok(None);
    };
    let items = fetch_line_items(order_id, conn).await?;
    Ok(Some(FullOrder { order, items }))
}

pub async fn fetch_full_orders_for_user(
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<FullOrder>, StoreQueryError> {
    let orders = fetch_orders_for_user(user_id, conn).await?;
    let mut result = Vec::with_capacity(orders.len());
    for order in orders {
        let items = fetch_line_items(order.id, conn).await?;
        result.push(FullOrder { order, items });
    }
    Ok(result)
}

/// Moves an order to the given order / payment status pair and returns the updated record.
pub async fn set_order_state(
    order_id: i64,
    status: OrderStatus,
    payment_status: PaymentStatus,
    conn: &mut SqliteConnection,
) -> Result<Order, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE orders SET status = $1, payment_status = $2, updated_at = CURRENT_TIMESTAMP
        WHERE id = $3
        RETURNING *;
    "#,
    )
    .bind(status)
    .bind(payment_status)
    .bind(order_id)
    .fetch_one(conn)
    .await
}

pub async fn attach_snap_token(
    order_id: i64,
    token: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE orders SET snap_token = $1, updated_at = CURRENT_TIMESTAMP
        WHERE id = $2
        RETURNING *;
    "#,
    )
    .bind(token)
    .bind(order_id)
    .fetch_optional(conn)
    .await
}

/// Deletes an order and its line items. Only used when a checkout has to be unwound.
pub async fn delete_order(order_id: i64, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query(r#"DELETE FROM order_items WHERE order_id = $1"#).bind(order_id).execute(&mut *conn).await?;
    let result = sqlx::query(r#"DELETE FROM orders WHERE id = $1"#).bind(order_id).execute(conn).await?;
    if result.rows_affected() == 0 {
        warn!("📝️ Tried to delete order #{order_id}, but it was already gone");
    }
    Ok(())
}
