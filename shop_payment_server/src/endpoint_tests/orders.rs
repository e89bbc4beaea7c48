use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use log::debug;
use shop_common::Rupiah;
use shop_payment_engine::{
    db_types::{Order, OrderItem, OrderStatus, PaymentStatus, Product},
    order_objects::{FullOrder, LineItem},
    StoreApi,
};

use super::helpers::{get_request, issue_token};
use crate::{
    endpoint_tests::mocks::MockStoreBackend,
    routes::{MyOrdersRoute, OrderByIdRoute, PaymentStatusRoute},
};

#[actix_web::test]
async fn fetch_my_orders_no_token() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("", "/orders", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"error":"Authentication Error. No access token provided."}"#);
}

#[actix_web::test]
async fn fetch_my_orders() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(1);
    let (status, body) = get_request(&token, "/orders", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, format!("[{ORDER_JSON}]"));
}

#[actix_web::test]
async fn fetch_my_orders_invalid_sig() {
    let _ = env_logger::try_init().ok();
    let mut token = issue_token(1);
    token.replace_range(token.len() - 10..token.len() - 5, "00000");
    debug!("Calling /orders with tampered token {token}");
    let (status, body) = get_request(&token, "/orders", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body,
        r#"{"error":"Authentication Error. Access token signature is invalid. signature has failed verification"}"#
    );
}

#[actix_web::test]
async fn fetch_one_of_my_orders() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(1);
    let (status, body) = get_request(&token, "/orders/1", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, ORDER_JSON);
}

#[actix_web::test]
async fn another_users_order_is_a_404() {
    let _ = env_logger::try_init().ok();
    // Order 1 exists, but it belongs to user 1. User 2 cannot tell it apart from an order that
    // was never placed.
    let token = issue_token(2);
    let (status, body) = get_request(&token, "/orders/1", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"The data was not found. Order 1 does not exist"}"#);
}

#[actix_web::test]
async fn payment_status_of_my_order() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(1);
    let (status, body) = get_request(&token, "/payment/status/1", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"order_id":1,"status":"Pending","payment_status":"Unpaid","snap_token":"token-1","payment":null}"#);
}

#[actix_web::test]
async fn payment_status_is_masked_like_orders() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(2);
    let (status, body) = get_request(&token, "/payment/status/1", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"The data was not found. Order 1 does not exist"}"#);
}

fn configure(cfg: &mut ServiceConfig) {
    let mut store = MockStoreBackend::new();
    store.expect_fetch_orders_for_user().returning(|_| Ok(vec![order_response()]));
    store
        .expect_fetch_order_for_user()
        .returning(|user_id, order_id| Ok((user_id == 1 && order_id == 1).then(order_response)));
    store.expect_fetch_payment_for_order().returning(|_| Ok(None));
    let api = StoreApi::new(store);
    cfg.service(MyOrdersRoute::<MockStoreBackend>::new())
        .service(OrderByIdRoute::<MockStoreBackend>::new())
        .service(PaymentStatusRoute::<MockStoreBackend>::new())
        .app_data(web::Data::new(api));
}

// Mock response to the `fetch_order_for_user` call: order 1, owned by user 1
fn order_response() -> FullOrder {
    let ts = Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap();
    FullOrder {
        order: Order {
            id: 1,
            user_id: 1,
            total_amount: Rupiah::from(1_500_000),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            snap_token: Some("token-1".to_string()),
            created_at: ts,
            updated_at: ts,
        },
        items: vec![LineItem {
            item: OrderItem {
                id: 1,
                order_id: 1,
                product_id: 1,
                quantity: 2,
                price: Rupiah::from(750_000),
                subtotal: Rupiah::from(1_500_000),
                created_at: ts,
            },
            product: Product {
                id: 1,
                name: "Mechanical Keyboard".to_string(),
                description: None,
                price: Rupiah::from(750_000),
                stock: 10,
                created_at: ts,
                updated_at: ts,
            },
        }],
    }
}

const ORDER_JSON: &str = r#"{"id":1,"user_id":1,"total_amount":1500000,"status":"Pending","payment_status":"Unpaid","snap_token":"token-1","created_at":"2024-02-29T13:30:00Z","updated_at":"2024-02-29T13:30:00Z","items":[{"id":1,"order_id":1,"product_id":1,"quantity":2,"price":750000,"subtotal":1500000,"created_at":"2024-02-29T13:30:00Z","product":{"id":1,"name":"Mechanical Keyboard","description":null,"price":750000,"stock":10,"created_at":"2024-02-29T13:30:00Z","updated_at":"2024-02-29T13:30:00Z"}}]}"#;
