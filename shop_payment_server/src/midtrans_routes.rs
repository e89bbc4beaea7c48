//----------------------------------------------   Payment notifications  ---------------------------------------------

use actix_web::{web, HttpRequest, HttpResponse};
use log::*;
use midtrans_tools::SnapNotification;
use shop_payment_engine::{CheckoutDatabase, ReconciliationApi};

use crate::{
    config::ServerOptions,
    data_objects::JsonResponse,
    errors::ServerError,
    helpers::get_remote_ip,
    integrations::midtrans::payment_update_from_notification,
    route,
};

route!(payment_notification => Post "/notification" impl CheckoutDatabase);
/// The webhook Midtrans calls with payment outcomes.
///
/// The gateway retries until it sees a 2xx, delivers duplicates, and reports statuses this server
/// has never heard of. A handled notification is a 200 even when the news is bad (an expired or
/// denied payment is still a successful handling); 400 is reserved for bodies this server cannot
/// read, 404 for order references it does not hold, and 500 for its own failures.
pub async fn payment_notification<B: CheckoutDatabase>(
    req: HttpRequest,
    body: web::Bytes,
    api: web::Data<ReconciliationApi<B>>,
    options: web::Data<ServerOptions>,
) -> Result<HttpResponse, ServerError> {
    let peer = get_remote_ip(&req, options.use_x_forwarded_for, options.use_forwarded)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown peer".into());
    trace!("🔔️ Received a payment notification from {peer}");
    let notification: SnapNotification = serde_json::from_slice(&body).map_err(|e| {
        warn!("🔔️ Could not parse the notification body from {peer}. {e}. Payload: {}", String::from_utf8_lossy(&body));
        ServerError::InvalidRequestBody(e.to_string())
    })?;
    let raw = String::from_utf8_lossy(&body).into_owned();
    let update = payment_update_from_notification(&notification, raw).map_err(|e| {
        warn!("🔔️ Rejecting notification from {peer}. {e}. Payload: {}", String::from_utf8_lossy(&body));
        ServerError::InvalidRequestBody(e.to_string())
    })?;
    let order_id = update.order_id;
    debug!("🔔️ '{}' notification for order {order_id} from {peer}", update.status);
    let result = api.process_update(update).await.map_err(|e| {
        warn!(
            "🔔️ Notification for order {order_id} was not applied. {e}. Payload: {}",
            String::from_utf8_lossy(&body)
        );
        ServerError::from(e)
    })?;
    Ok(HttpResponse::Ok().json(JsonResponse::success(result.message())))
}
