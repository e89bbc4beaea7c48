use log::*;
use sqlx::SqliteConnection;

use crate::db_types::{Payment, PaymentUpdate};

/// Writes the gateway's latest word on an order's payment.
///
/// There is at most one payment row per order. The first notification inserts it; every later one overwrites it
/// in place, so the row always reflects the most recent notification, whatever order they arrived in.
pub async fn upsert_payment(update: &PaymentUpdate, conn: &mut SqliteConnection) -> Result<Payment, sqlx::Error> {
    let payment: Payment = sqlx::query_as(
        r#"
        INSERT INTO payments (order_id, payment_method, amount, transaction_id, status, response)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (order_id) DO UPDATE SET
            payment_method = excluded.payment_method,
            amount = excluded.amount,
            transaction_id = excluded.transaction_id,
            status = excluded.status,
            response = excluded.response,
            updated_at = CURRENT_TIMESTAMP
        RETURNING *;
    "#,
    )
    .bind(update.order_id)
    .bind(&update.payment_method)
    .bind(update.amount)
    .bind(&update.transaction_id)
    .bind(update.status.to_string())
    .bind(&update.raw)
    .fetch_one(conn)
    .await?;
    trace!("📝️ Payment record for order #{} now reads '{}'", payment.order_id, payment.status);
    Ok(payment)
}

pub async fn fetch_payment_for_order(
    order_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, sqlx::Error> {
    sqlx::query_as(r#"SELECT * FROM payments WHERE order_id = $1"#).bind(order_id).fetch_optional(conn).await
}
