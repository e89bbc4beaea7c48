use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use shop_common::Rupiah;
use shop_payment_engine::{db_types::Product, StoreApi};

use super::helpers::get_request;
use crate::{
    endpoint_tests::mocks::MockStoreBackend,
    routes::{ProductByIdRoute, ProductsRoute},
};

#[actix_web::test]
async fn fetch_the_catalog() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("", "/products", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, format!("[{KEYBOARD_JSON},{DOCK_JSON}]"));
}

#[actix_web::test]
async fn fetch_a_single_product() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("", "/products/1", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, KEYBOARD_JSON);
}

#[actix_web::test]
async fn unknown_products_are_a_404() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("", "/products/99", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"The data was not found. Product 99 does not exist"}"#);
}

fn configure(cfg: &mut ServiceConfig) {
    let mut store = MockStoreBackend::new();
    store.expect_fetch_products().returning(|| Ok(catalog()));
    store.expect_fetch_product_by_id().returning(|id| Ok(catalog().into_iter().find(|p| p.id == id)));
    let api = StoreApi::new(store);
    cfg.service(ProductsRoute::<MockStoreBackend>::new())
        .service(ProductByIdRoute::<MockStoreBackend>::new())
        .app_data(web::Data::new(api));
}

// Mock response to the `fetch_products` call
fn catalog() -> Vec<Product> {
    vec![
        Product {
            id: 1,
            name: "Mechanical Keyboard".to_string(),
            description: Some("87-key hot-swappable board".to_string()),
            price: Rupiah::from(750_000),
            stock: 12,
            created_at: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
        },
        Product {
            id: 2,
            name: "USB-C Dock".to_string(),
            description: None,
            price: Rupiah::from(1_250_000),
            stock: 5,
            created_at: Utc.with_ymd_and_hms(2024, 3, 15, 18, 30, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 3, 16, 11, 20, 0).unwrap(),
        },
    ]
}

const KEYBOARD_JSON: &str = r#"{"id":1,"name":"Mechanical Keyboard","description":"87-key hot-swappable board","price":750000,"stock":12,"created_at":"2024-02-29T13:30:00Z","updated_at":"2024-02-29T13:30:00Z"}"#;
const DOCK_JSON: &str = r#"{"id":2,"name":"USB-C Dock","description":null,"price":1250000,"stock":5,"created_at":"2024-03-15T18:30:00Z","updated_at":"2024-03-16T11:20:00Z"}"#;
