//! Checkout endpoint tests, running against a real (temporary) SQLite database so the
//! reservation-and-unwind behaviour is exercised end to end. Only the gateway is scripted.
use actix_web::{http::StatusCode, web, web::ServiceConfig};
use serde_json::json;
use shop_common::Rupiah;
use shop_payment_engine::{
    db_types::{CartItem, FraudStatus, PaymentUpdate, Product, TransactionStatus},
    test_utils::{
        gateway::TestGateway,
        prepare_env::{prepare_test_env, random_db_path},
        seed::{seed_product, seed_user},
    },
    CheckoutApi,
    PaymentSessionError,
    ReconciliationApi,
    SqliteDatabase,
    StoreQueries,
};

use super::helpers::{issue_token, post_raw_request, post_request};
use crate::routes::{CheckoutRoute, GenerateTokenRoute};

/// A fresh database with one customer and two products on the shelf.
async fn store_with_stock(url: &str) -> (SqliteDatabase, i64, Product, Product) {
    prepare_test_env(url).await;
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error connecting to database");
    let user = seed_user(&db, "Budi", "budi@example.com").await;
    let keyboard = seed_product(&db, "Mechanical Keyboard", 750_000, 10).await;
    let dock = seed_product(&db, "USB-C Dock", 1_250_000, 5).await;
    (db, user.id, keyboard, dock)
}

fn configure(cfg: &mut ServiceConfig, db: SqliteDatabase, gateway: TestGateway) {
    let api = CheckoutApi::new(db, gateway);
    cfg.service(CheckoutRoute::<SqliteDatabase, TestGateway>::new())
        .service(GenerateTokenRoute::<SqliteDatabase, TestGateway>::new())
        .app_data(web::Data::new(api));
}

#[actix_web::test]
async fn checkout_creates_an_order_and_a_payment_session() -> anyhow::Result<()> {
    let url = random_db_path();
    let (db, user_id, keyboard, dock) = store_with_stock(&url).await;
    let token = issue_token(user_id);
    let cart = json!({ "items": [
        { "product_id": keyboard.id, "quantity": 2 },
        { "product_id": dock.id, "quantity": 1 },
    ]});
    let (status, body) = {
        let db = db.clone();
        post_request(&token, "/checkout", cart, move |cfg| configure(cfg, db, TestGateway::default()))
            .await
            .expect("Request failed")
    };
    assert_eq!(status, StatusCode::CREATED);
    let result: serde_json::Value = serde_json::from_str(&body)?;
    let order = &result["order"];
    assert_eq!(order["user_id"], user_id);
    assert_eq!(order["status"], "Pending");
    assert_eq!(order["payment_status"], "Unpaid");
    assert_eq!(order["total_amount"], 2_750_000);
    assert_eq!(order["items"].as_array().map(Vec::len), Some(2));
    let order_id = order["id"].as_i64().unwrap();
    assert_eq!(result["snap_token"], format!("token-{order_id}"));
    assert_eq!(result["redirect_url"], format!("https://payments.example.com/pay/{order_id}"));
    // The stock is reserved and the token is stored on the order.
    assert_eq!(db.fetch_product_by_id(keyboard.id).await?.unwrap().stock, 8);
    assert_eq!(db.fetch_product_by_id(dock.id).await?.unwrap().stock, 4);
    let saved = db.fetch_order_for_user(user_id, order_id).await?.unwrap();
    assert_eq!(saved.order.snap_token, Some(format!("token-{order_id}")));
    Ok(())
}

#[actix_web::test]
async fn empty_carts_are_rejected() {
    let url = random_db_path();
    let (db, user_id, _, _) = store_with_stock(&url).await;
    let token = issue_token(user_id);
    let (status, body) = post_request(&token, "/checkout", json!({ "items": [] }), move |cfg| {
        configure(cfg, db, TestGateway::default())
    })
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body, r#"{"error":"Invalid request: Cart cannot be empty"}"#);
}

#[actix_web::test]
async fn nonsense_quantities_are_rejected() {
    let url = random_db_path();
    let (db, user_id, keyboard, _) = store_with_stock(&url).await;
    let token = issue_token(user_id);
    let cart = json!({ "items": [{ "product_id": keyboard.id, "quantity": 0 }] });
    let (status, body) =
        post_request(&token, "/checkout", cart, move |cfg| configure(cfg, db, TestGateway::default()))
            .await
            .expect("Request failed");
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body, format!(r#"{{"error":"Invalid request: Quantity for product {} must be at least 1"}}"#, keyboard.id));
}

#[actix_web::test]
async fn unknown_products_are_rejected() -> anyhow::Result<()> {
    let url = random_db_path();
    let (db, user_id, _, _) = store_with_stock(&url).await;
    let token = issue_token(user_id);
    let cart = json!({ "items": [{ "product_id": 999, "quantity": 1 }] });
    let (status, body) = {
        let db = db.clone();
        post_request(&token, "/checkout", cart, move |cfg| configure(cfg, db, TestGateway::default()))
            .await
            .expect("Request failed")
    };
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body, r#"{"error":"Invalid request: Product 999 does not exist"}"#);
    assert!(db.fetch_orders_for_user(user_id).await?.is_empty());
    Ok(())
}

#[actix_web::test]
async fn overdrawn_carts_change_nothing() -> anyhow::Result<()> {
    let url = random_db_path();
    let (db, user_id, keyboard, dock) = store_with_stock(&url).await;
    let token = issue_token(user_id);
    // The second line overdraws. The first line must not stay reserved.
    let cart = json!({ "items": [
        { "product_id": keyboard.id, "quantity": 1 },
        { "product_id": dock.id, "quantity": 6 },
    ]});
    let (status, body) = {
        let db = db.clone();
        post_request(&token, "/checkout", cart, move |cfg| configure(cfg, db, TestGateway::default()))
            .await
            .expect("Request failed")
    };
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"Insufficient stock for product: USB-C Dock"}"#);
    assert_eq!(db.fetch_product_by_id(keyboard.id).await?.unwrap().stock, 10);
    assert_eq!(db.fetch_product_by_id(dock.id).await?.unwrap().stock, 5);
    assert!(db.fetch_orders_for_user(user_id).await?.is_empty());
    Ok(())
}

#[actix_web::test]
async fn gateway_failures_unwind_the_checkout() -> anyhow::Result<()> {
    let url = random_db_path();
    let (db, user_id, keyboard, _) = store_with_stock(&url).await;
    let token = issue_token(user_id);
    let cart = json!({ "items": [{ "product_id": keyboard.id, "quantity": 3 }] });
    let (status, body) = {
        let db = db.clone();
        post_request(&token, "/checkout", cart, move |cfg| {
            configure(cfg, db, TestGateway::failing(PaymentSessionError::Timeout))
        })
        .await
        .expect("Request failed")
    };
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, r#"{"error":"Could not create a payment session. The payment gateway did not respond in time"}"#);
    // The reservation was unwound and the order deleted.
    assert_eq!(db.fetch_product_by_id(keyboard.id).await?.unwrap().stock, 10);
    assert!(db.fetch_orders_for_user(user_id).await?.is_empty());
    Ok(())
}

#[actix_web::test]
async fn checkout_needs_a_token() {
    let url = random_db_path();
    let (db, _user_id, keyboard, _) = store_with_stock(&url).await;
    let cart = json!({ "items": [{ "product_id": keyboard.id, "quantity": 1 }] });
    let (status, body) = post_request("", "/checkout", cart, move |cfg| configure(cfg, db, TestGateway::default()))
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"error":"Authentication Error. No access token provided."}"#);
}

#[actix_web::test]
async fn unparseable_bodies_are_a_400() {
    let url = random_db_path();
    let (db, user_id, _, _) = store_with_stock(&url).await;
    let token = issue_token(user_id);
    let (status, _body) =
        post_raw_request(&token, "/checkout", "{ not json", move |cfg| configure(cfg, db, TestGateway::default()))
            .await
            .expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

//----------------------------------------   Token regeneration  -----------------------------------------------------

/// Checks out a one-keyboard order through the engine, so the tests can work on an existing order.
async fn existing_order(db: &SqliteDatabase, user_id: i64, product_id: i64) -> i64 {
    let api = CheckoutApi::new(db.clone(), TestGateway::default());
    let cart = [CartItem { product_id, quantity: 2 }];
    let result = api.checkout(user_id, &cart).await.expect("Checkout failed");
    result.order.order.id
}

#[actix_web::test]
async fn regenerated_tokens_use_a_suffixed_ref() -> anyhow::Result<()> {
    let url = random_db_path();
    let (db, user_id, keyboard, _) = store_with_stock(&url).await;
    let order_id = existing_order(&db, user_id, keyboard.id).await;
    let token = issue_token(user_id);
    let path = format!("/payment/generate-token/{order_id}");
    let (status, body) = {
        let db = db.clone();
        post_request(&token, &path, json!({}), move |cfg| configure(cfg, db, TestGateway::default()))
            .await
            .expect("Request failed")
    };
    assert_eq!(status, StatusCode::OK);
    let result: serde_json::Value = serde_json::from_str(&body)?;
    // The replacement session runs under "{order_id}-{unix_time}", not the original ref.
    let snap_token = result["snap_token"].as_str().unwrap();
    assert!(snap_token.starts_with(&format!("token-{order_id}-")), "was: {snap_token}");
    let saved = db.fetch_order_for_user(user_id, order_id).await?.unwrap();
    assert_eq!(saved.order.snap_token.as_deref(), Some(snap_token));
    Ok(())
}

#[actix_web::test]
async fn paid_orders_get_no_replacement_token() {
    let url = random_db_path();
    let (db, user_id, keyboard, _) = store_with_stock(&url).await;
    let order_id = existing_order(&db, user_id, keyboard.id).await;
    let update = PaymentUpdate {
        order_id,
        payment_method: "qris".to_string(),
        amount: Rupiah::from(1_500_000),
        transaction_id: "qris-001".to_string(),
        status: TransactionStatus::Settlement,
        fraud_status: FraudStatus::Accept,
        raw: "{}".to_string(),
    };
    ReconciliationApi::new(db.clone()).process_update(update).await.expect("Error applying the payment");
    let token = issue_token(user_id);
    let path = format!("/payment/generate-token/{order_id}");
    let (status, body) = post_request(&token, &path, json!({}), move |cfg| configure(cfg, db, TestGateway::default()))
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body,
        format!(r#"{{"error":"Invalid request: Order {order_id} can no longer be paid (payment status is Paid)"}}"#)
    );
}

#[actix_web::test]
async fn token_regeneration_is_owner_only() {
    let url = random_db_path();
    let (db, user_id, keyboard, _) = store_with_stock(&url).await;
    let order_id = existing_order(&db, user_id, keyboard.id).await;
    let other = seed_user(&db, "Sari", "sari@example.com").await;
    let token = issue_token(other.id);
    let path = format!("/payment/generate-token/{order_id}");
    let (status, body) = post_request(&token, &path, json!({}), move |cfg| configure(cfg, db, TestGateway::default()))
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, format!(r#"{{"error":"The data was not found. Order {order_id} does not exist"}}"#));
}
