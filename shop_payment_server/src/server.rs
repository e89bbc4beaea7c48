use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use shop_payment_engine::{sqlite, CheckoutApi, ReconciliationApi, SqliteDatabase, StoreApi};

use crate::{
    auth::TokenIssuer,
    config::{ServerConfig, ServerOptions},
    errors::ServerError,
    integrations::midtrans::SnapGateway,
    midtrans_routes::PaymentNotificationRoute,
    routes::{
        health,
        CheckoutRoute,
        GenerateTokenRoute,
        MyOrdersRoute,
        OrderByIdRoute,
        PaymentStatusRoute,
        ProductByIdRoute,
        ProductsRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    sqlite::run_migrations(db.pool())
        .await
        .map_err(|e| ServerError::InitializeError(format!("Could not run database migrations: {e}")))?;
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let gateway = SnapGateway::new(config.midtrans.clone(), &config.app_url)
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let host = config.host.clone();
    let port = config.port;
    let srv = HttpServer::new(move || {
        let checkout_api = CheckoutApi::new(db.clone(), gateway.clone());
        let store_api = StoreApi::new(db.clone());
        let reconciliation_api = ReconciliationApi::new(db.clone());
        let token_issuer = TokenIssuer::new(&config.auth);
        let options = ServerOptions::from_config(&config);
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("sps::access_log"))
            .app_data(web::Data::new(checkout_api))
            .app_data(web::Data::new(store_api))
            .app_data(web::Data::new(reconciliation_api))
            .app_data(web::Data::new(token_issuer))
            .app_data(web::Data::new(options));
        // Routes that require an access token
        let api_scope = web::scope("/api")
            .service(CheckoutRoute::<SqliteDatabase, SnapGateway>::new())
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(PaymentStatusRoute::<SqliteDatabase>::new())
            .service(GenerateTokenRoute::<SqliteDatabase, SnapGateway>::new());
        // The gateway holds no access token, so its notification route lives outside /api
        let payment_scope = web::scope("/payment").service(PaymentNotificationRoute::<SqliteDatabase>::new());
        app.service(health)
            .service(ProductsRoute::<SqliteDatabase>::new())
            .service(ProductByIdRoute::<SqliteDatabase>::new())
            .service(api_scope)
            .service(payment_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
