use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    config::MidtransConfig,
    data_objects::{SnapTokenResponse, SnapTransactionRequest},
    MidtransApiError,
};

/// Client for the Midtrans Snap REST API.
///
/// Authentication is HTTP Basic with the server key as username and an empty
/// password, baked into the default headers at construction time.
#[derive(Clone)]
pub struct SnapApi {
    config: MidtransConfig,
    client: Arc<Client>,
}

impl SnapApi {
    pub fn new(config: MidtransConfig) -> Result<Self, MidtransApiError> {
        let mut headers = HeaderMap::with_capacity(3);
        let credentials = base64::encode(format!("{}:", config.server_key.reveal()));
        let val = HeaderValue::from_str(&format!("Basic {credentials}"))
            .map_err(|e| MidtransApiError::Initialization(e.to_string()))?;
        headers.insert("Authorization", val);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| MidtransApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T, MidtransApiError> {
        let url = self.config.snap_url(path);
        trace!("Sending Snap query: {url}");
        let mut req = self.client.request(method, url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                MidtransApiError::Timeout
            } else {
                MidtransApiError::Transport(e.to_string())
            }
        })?;
        if response.status().is_success() {
            trace!("Snap query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| MidtransApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| MidtransApiError::Transport(e.to_string()))?;
            Err(MidtransApiError::SnapError { status, message })
        }
    }

    /// Create a Snap transaction, returning the token for the hosted payment
    /// page.
    pub async fn create_transaction(
        &self,
        request: &SnapTransactionRequest,
    ) -> Result<SnapTokenResponse, MidtransApiError> {
        let order_ref = request.transaction_details.order_id.as_str();
        debug!("Requesting Snap token for order {order_ref}");
        let result = self.rest_query::<SnapTokenResponse, _>(Method::POST, "/transactions", Some(request)).await?;
        info!("Snap token issued for order {order_ref}");
        Ok(result)
    }

    /// The hosted payment page for a token issued by [`Self::create_transaction`].
    pub fn redirect_url(&self, token: &str) -> String {
        self.config.redirect_url(token)
    }
}
