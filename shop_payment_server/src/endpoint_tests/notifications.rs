//! Webhook tests for the notification endpoint, against a real (temporary) SQLite database.
//!
//! The status-code contract matters more here than anywhere else: Midtrans retries anything that is
//! not a 2xx, so a handled notification must be a 200 even when the news is bad, and only bodies this
//! server cannot read or orders it does not hold may be refused.
use actix_web::{http::StatusCode, web, web::ServiceConfig};
use serde_json::json;
use shop_common::Rupiah;
use shop_payment_engine::{
    db_types::{CartItem, OrderStatus, PaymentStatus},
    test_utils::{
        gateway::TestGateway,
        prepare_env::{prepare_test_env, random_db_path},
        seed::{seed_product, seed_user},
    },
    CheckoutApi,
    ReconciliationApi,
    SqliteDatabase,
    StoreQueries,
};

use super::helpers::{post_raw_request, post_request};
use crate::{config::ServerOptions, midtrans_routes::PaymentNotificationRoute};

/// A database holding one freshly checked-out order (2 keyboards, Rp1.500.000), ready for the
/// gateway to report on.
async fn checked_out_store(url: &str) -> (SqliteDatabase, i64, i64, i64) {
    prepare_test_env(url).await;
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error connecting to database");
    let user = seed_user(&db, "Budi", "budi@example.com").await;
    let product = seed_product(&db, "Mechanical Keyboard", 750_000, 10).await;
    let api = CheckoutApi::new(db.clone(), TestGateway::default());
    let cart = [CartItem { product_id: product.id, quantity: 2 }];
    let result = api.checkout(user.id, &cart).await.expect("Checkout failed");
    (db, user.id, result.order.order.id, product.id)
}

fn configure(cfg: &mut ServiceConfig, db: SqliteDatabase) {
    let api = ReconciliationApi::new(db);
    let options = ServerOptions { use_x_forwarded_for: false, use_forwarded: false };
    cfg.service(PaymentNotificationRoute::<SqliteDatabase>::new())
        .app_data(web::Data::new(api))
        .app_data(web::Data::new(options));
}

fn notification(order_ref: &str, status: &str) -> serde_json::Value {
    json!({
        "order_id": order_ref,
        "transaction_status": status,
        "fraud_status": "accept",
        "gross_amount": "1500000.00",
        "payment_type": "qris",
        "transaction_id": "qris-001",
        "status_code": "200",
    })
}

#[actix_web::test]
async fn settlements_mark_the_order_paid() -> anyhow::Result<()> {
    let url = random_db_path();
    let (db, user_id, order_id, product_id) = checked_out_store(&url).await;
    let body = notification(&order_id.to_string(), "settlement");
    let (status, body) = {
        let db = db.clone();
        post_request("", "/notification", body, move |cfg| configure(cfg, db)).await.expect("Request failed")
    };
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true,"message":"Payment successful"}"#);
    let order = db.fetch_order_for_user(user_id, order_id).await?.unwrap().order;
    assert_eq!(order.status, OrderStatus::Processing);
    assert_eq!(order.payment_status, PaymentStatus::Paid);
    let payment = db.fetch_payment_for_order(order_id).await?.unwrap();
    assert_eq!(payment.transaction_id, "qris-001");
    assert_eq!(payment.status, "settlement");
    assert_eq!(payment.amount, Rupiah::from(1_500_000));
    // Paying does not touch the shelf.
    assert_eq!(db.fetch_product_by_id(product_id).await?.unwrap().stock, 8);
    Ok(())
}

#[actix_web::test]
async fn failed_payments_restock_exactly_once() -> anyhow::Result<()> {
    let url = random_db_path();
    let (db, user_id, order_id, product_id) = checked_out_store(&url).await;
    let expired = notification(&order_id.to_string(), "expire");
    let (status, body) = {
        let db = db.clone();
        post_request("", "/notification", expired.clone(), move |cfg| configure(cfg, db))
            .await
            .expect("Request failed")
    };
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true,"message":"Payment failed or cancelled"}"#);
    let order = db.fetch_order_for_user(user_id, order_id).await?.unwrap().order;
    assert_eq!(order.status, OrderStatus::Cancelled);
    assert_eq!(order.payment_status, PaymentStatus::Failed);
    assert_eq!(db.fetch_product_by_id(product_id).await?.unwrap().stock, 10);

    // The gateway redelivers. The replay converges and the stock is not returned a second time.
    let (status, body) = {
        let db = db.clone();
        post_request("", "/notification", expired, move |cfg| configure(cfg, db)).await.expect("Request failed")
    };
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true,"message":"Payment failed or cancelled"}"#);
    assert_eq!(db.fetch_product_by_id(product_id).await?.unwrap().stock, 10);
    Ok(())
}

#[actix_web::test]
async fn pending_payments_only_touch_the_payment_status() -> anyhow::Result<()> {
    let url = random_db_path();
    let (db, user_id, order_id, product_id) = checked_out_store(&url).await;
    let body = notification(&order_id.to_string(), "pending");
    let (status, body) = {
        let db = db.clone();
        post_request("", "/notification", body, move |cfg| configure(cfg, db)).await.expect("Request failed")
    };
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true,"message":"Payment pending"}"#);
    let order = db.fetch_order_for_user(user_id, order_id).await?.unwrap().order;
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert_eq!(db.fetch_product_by_id(product_id).await?.unwrap().stock, 8);
    Ok(())
}

#[actix_web::test]
async fn flagged_captures_are_left_alone() -> anyhow::Result<()> {
    let url = random_db_path();
    let (db, user_id, order_id, _) = checked_out_store(&url).await;
    let mut body = notification(&order_id.to_string(), "capture");
    body["fraud_status"] = json!("challenge");
    let (status, body) = {
        let db = db.clone();
        post_request("", "/notification", body, move |cfg| configure(cfg, db)).await.expect("Request failed")
    };
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true,"message":"Payment status unchanged: capture held back by fraud status 'challenge'"}"#);
    let order = db.fetch_order_for_user(user_id, order_id).await?.unwrap().order;
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.payment_status, PaymentStatus::Unpaid);
    Ok(())
}

#[actix_web::test]
async fn unknown_statuses_are_acknowledged() -> anyhow::Result<()> {
    let url = random_db_path();
    let (db, user_id, order_id, _) = checked_out_store(&url).await;
    let body = notification(&order_id.to_string(), "refund");
    let (status, body) = {
        let db = db.clone();
        post_request("", "/notification", body, move |cfg| configure(cfg, db)).await.expect("Request failed")
    };
    // Refusing would only make the gateway retry a notification we will never understand.
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true,"message":"Payment status unchanged: unknown transaction status 'refund'"}"#);
    let order = db.fetch_order_for_user(user_id, order_id).await?.unwrap().order;
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.payment_status, PaymentStatus::Unpaid);
    Ok(())
}

#[actix_web::test]
async fn suffixed_refs_from_regenerated_tokens_resolve() -> anyhow::Result<()> {
    let url = random_db_path();
    let (db, user_id, order_id, _) = checked_out_store(&url).await;
    let body = notification(&format!("{order_id}-1712345678"), "settlement");
    let (status, body) = {
        let db = db.clone();
        post_request("", "/notification", body, move |cfg| configure(cfg, db)).await.expect("Request failed")
    };
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true,"message":"Payment successful"}"#);
    let order = db.fetch_order_for_user(user_id, order_id).await?.unwrap().order;
    assert_eq!(order.payment_status, PaymentStatus::Paid);
    Ok(())
}

#[actix_web::test]
async fn unknown_orders_are_a_404() {
    let url = random_db_path();
    let (db, _, _, _) = checked_out_store(&url).await;
    let body = notification("424242", "settlement");
    let (status, body) =
        post_request("", "/notification", body, move |cfg| configure(cfg, db)).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"The data was not found. Order 424242 does not exist"}"#);
}

#[actix_web::test]
async fn malformed_notifications_are_a_400() {
    let url = random_db_path();
    let (db, _, order_id, _) = checked_out_store(&url).await;

    let missing_order = json!({ "transaction_status": "settlement" });
    let (status, body) = {
        let db = db.clone();
        post_request("", "/notification", missing_order, move |cfg| configure(cfg, db)).await.expect("Request failed")
    };
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"Could not read request body: The notification is missing the order_id field"}"#);

    let missing_status = json!({ "order_id": order_id.to_string() });
    let (status, body) = {
        let db = db.clone();
        post_request("", "/notification", missing_status, move |cfg| configure(cfg, db)).await.expect("Request failed")
    };
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        r#"{"error":"Could not read request body: The notification is missing the transaction_status field"}"#
    );

    let foreign_ref = json!({ "order_id": "order-41", "transaction_status": "settlement" });
    let (status, body) = {
        let db = db.clone();
        post_request("", "/notification", foreign_ref, move |cfg| configure(cfg, db)).await.expect("Request failed")
    };
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"Could not read request body: 'order-41' does not refer to an order on this server"}"#);

    let (status, body) = post_raw_request("", "/notification", "{ not json", move |cfg| configure(cfg, db))
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Could not read request body"), "was: {body}");
}
