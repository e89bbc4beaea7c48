use mockall::mock;
use shop_payment_engine::{
    db_types::{Payment, Product, User},
    order_objects::FullOrder,
    traits::{StoreQueries, StoreQueryError},
};

mock! {
    pub StoreBackend {}
    impl StoreQueries for StoreBackend {
        async fn fetch_products(&self) -> Result<Vec<Product>, StoreQueryError>;
        async fn fetch_product_by_id(&self, product_id: i64) -> Result<Option<Product>, StoreQueryError>;
        async fn fetch_user_by_id(&self, user_id: i64) -> Result<Option<User>, StoreQueryError>;
        async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<FullOrder>, StoreQueryError>;
        async fn fetch_order_for_user(&self, user_id: i64, order_id: i64) -> Result<Option<FullOrder>, StoreQueryError>;
        async fn fetch_payment_for_order(&self, order_id: i64) -> Result<Option<Payment>, StoreQueryError>;
    }
}
