use std::time::Duration;

use log::*;
use shop_common::{parse_boolean_flag, Secret};

pub const MIDTRANS_SANDBOX_HOST: &str = "https://app.sandbox.midtrans.com";
pub const MIDTRANS_PRODUCTION_HOST: &str = "https://app.midtrans.com";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct MidtransConfig {
    pub server_key: Secret<String>,
    pub is_production: bool,
    /// Upper bound on any single gateway call. A stalled Snap request must
    /// not hold up checkout indefinitely; hitting the bound is handled like
    /// any other gateway failure.
    pub timeout: Duration,
}

impl Default for MidtransConfig {
    fn default() -> Self {
        Self {
            server_key: Secret::default(),
            is_production: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl MidtransConfig {
    pub fn new_from_env_or_default() -> Self {
        let server_key = Secret::new(std::env::var("SPS_MIDTRANS_SERVER_KEY").unwrap_or_else(|_| {
            warn!("SPS_MIDTRANS_SERVER_KEY not set. Snap requests will be rejected by the gateway");
            String::new()
        }));
        let is_production = parse_boolean_flag(std::env::var("SPS_MIDTRANS_IS_PRODUCTION").ok(), false);
        let timeout = match std::env::var("SPS_MIDTRANS_TIMEOUT").map(|v| v.parse::<u64>()) {
            Ok(Ok(secs)) => Duration::from_secs(secs),
            Ok(Err(e)) => {
                warn!("Invalid SPS_MIDTRANS_TIMEOUT ({e}), using {DEFAULT_TIMEOUT_SECS}s");
                Duration::from_secs(DEFAULT_TIMEOUT_SECS)
            },
            Err(_) => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };
        Self { server_key, is_production, timeout }
    }

    pub fn api_host(&self) -> &'static str {
        if self.is_production {
            MIDTRANS_PRODUCTION_HOST
        } else {
            MIDTRANS_SANDBOX_HOST
        }
    }

    /// Snap REST endpoint, e.g. `snap_url("/transactions")`.
    pub fn snap_url(&self, path: &str) -> String {
        format!("{}/snap/v1{path}", self.api_host())
    }

    /// The hosted payment page for a Snap token.
    pub fn redirect_url(&self, token: &str) -> String {
        format!("{}/snap/v2/vtweb/{token}", self.api_host())
    }
}
