//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests:
//! ```nocompile
//!     fn my_handler() -> impl Responder {
//!         std::thread::sleep(Duration::from_secs(5)); // <-- Bad practice! Will cause the current worker thread to
//! hang!
//!     }
//! ```
//! For this reason, any long, non-cpu-bound operation (e.g. I/O, database operations, etc.) should be expressed as
//! futures or asynchronous functions. Async handlers get executed concurrently by worker threads and thus don’t block
//! execution:
//!
//! ```nocompile
//!     async fn my_handler() -> impl Responder {
//!         tokio::time::sleep(Duration::from_secs(5)).await; // <-- Ok. Worker thread will handle other requests here
//!     }
//! ```
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use shop_payment_engine::{CheckoutApi, CheckoutDatabase, PaymentSessions, StoreApi, StoreQueries};

use crate::{auth::UserClaims, data_objects::CheckoutRequest, errors::ServerError};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Catalog  ----------------------------------------------------
route!(products => Get "/products" impl StoreQueries);
pub async fn products<B: StoreQueries>(api: web::Data<StoreApi<B>>) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET products");
    let products = api.products().await?;
    Ok(HttpResponse::Ok().json(products))
}

route!(product_by_id => Get "/products/{id}" impl StoreQueries);
pub async fn product_by_id<B: StoreQueries>(
    path: web::Path<i64>,
    api: web::Data<StoreApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ GET product {id}");
    let product = api
        .product_by_id(id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Product {id} does not exist")))?;
    Ok(HttpResponse::Ok().json(product))
}

//----------------------------------------------   Checkout  ----------------------------------------------------
route!(checkout => Post "/checkout" impl CheckoutDatabase, PaymentSessions);
/// Turns the caller's cart into an order with a live payment session.
///
/// The request body is `{ "items": [{ "product_id": _, "quantity": _ }] }`. Responds 201 with the
/// order, its items, the Snap token and the hosted payment page URL. Cart shape problems are a 422,
/// a line the stock cannot cover is a 400 (and nothing is reserved), and a gateway failure is a 500
/// after the checkout has been unwound.
pub async fn checkout<B, G>(
    claims: UserClaims,
    body: web::Json<CheckoutRequest>,
    api: web::Data<CheckoutApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: CheckoutDatabase,
    G: PaymentSessions,
{
    let request = body.into_inner();
    debug!("💻️ POST checkout for user {} with {} cart line(s)", claims.user_id, request.items.len());
    request.validate().map_err(|e| {
        debug!("💻️ Checkout request rejected. {e}");
        ServerError::ValidationError(e)
    })?;
    let result = api.checkout(claims.user_id, &request.to_cart()).await.map_err(|e| {
        debug!("💻️ Checkout for user {} failed. {e}", claims.user_id);
        ServerError::from(e)
    })?;
    Ok(HttpResponse::Created().json(result))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(my_orders => Get "/orders" impl StoreQueries);
pub async fn my_orders<B: StoreQueries>(
    claims: UserClaims,
    api: web::Data<StoreApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET orders for user {}", claims.user_id);
    let orders = api.orders_for_user(claims.user_id).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(order_by_id => Get "/orders/{id}" impl StoreQueries);
/// One of the caller's orders. An order belonging to someone else gets the same 404 as an order
/// that does not exist.
pub async fn order_by_id<B: StoreQueries>(
    claims: UserClaims,
    path: web::Path<i64>,
    api: web::Data<StoreApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ GET order {order_id} for user {}", claims.user_id);
    let order = api
        .order_for_user(claims.user_id, order_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Order {order_id} does not exist")))?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Payments  ----------------------------------------------------
route!(payment_status => Get "/payment/status/{order_id}" impl StoreQueries);
pub async fn payment_status<B: StoreQueries>(
    claims: UserClaims,
    path: web::Path<i64>,
    api: web::Data<StoreApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ GET payment status of order {order_id} for user {}", claims.user_id);
    let summary = api
        .payment_status(claims.user_id, order_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Order {order_id} does not exist")))?;
    Ok(HttpResponse::Ok().json(summary))
}

route!(generate_token => Post "/payment/generate-token/{order_id}" impl CheckoutDatabase, PaymentSessions);
/// Issues a replacement Snap token for an order that can still be paid, e.g. after the customer let
/// the original payment page expire.
pub async fn generate_token<B, G>(
    claims: UserClaims,
    path: web::Path<i64>,
    api: web::Data<CheckoutApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: CheckoutDatabase,
    G: PaymentSessions,
{
    let order_id = path.into_inner();
    debug!("💻️ POST generate token for order {order_id} by user {}", claims.user_id);
    let result = api.regenerate_snap_token(claims.user_id, order_id).await.map_err(|e| {
        debug!("💻️ Token regeneration for order {order_id} failed. {e}");
        ServerError::from(e)
    })?;
    Ok(HttpResponse::Ok().json(result))
}
