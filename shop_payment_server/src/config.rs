use std::{env, io::Write};

use chrono::Duration;
use log::*;
use midtrans_tools::MidtransConfig;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use serde_json::json;
use shop_common::{parse_boolean_flag, Secret};
use tempfile::NamedTempFile;

use crate::errors::ServerError;

const DEFAULT_SPS_HOST: &str = "127.0.0.1";
const DEFAULT_SPS_PORT: u16 = 8280;
const DEFAULT_SPS_APP_URL: &str = "http://localhost:3000";
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::hours(24);
const MIN_AUTH_SECRET_LEN: usize = 32;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Public base URL of the storefront. The payment page sends customers back to
    /// `{app_url}/payment/{success,failed,pending}/{order_id}` when they leave it.
    pub app_url: String,
    pub auth: AuthConfig,
    pub midtrans: MidtransConfig,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the Forwarded header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_forwarded: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SPS_HOST.to_string(),
            port: DEFAULT_SPS_PORT,
            database_url: String::default(),
            app_url: DEFAULT_SPS_APP_URL.to_string(),
            auth: AuthConfig::default(),
            midtrans: MidtransConfig::default(),
            use_x_forwarded_for: false,
            use_forwarded: false,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SPS_HOST").ok().unwrap_or_else(|| DEFAULT_SPS_HOST.into());
        let port = env::var("SPS_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for SPS_PORT. {e} Using the default, {DEFAULT_SPS_PORT}, instead."
                    );
                    DEFAULT_SPS_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_SPS_PORT);
        let database_url = env::var("SPS_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ SPS_DATABASE_URL is not set. Please set it to the URL for the shop database.");
            String::default()
        });
        let app_url = env::var("SPS_APP_URL").ok().unwrap_or_else(|| {
            info!("🪛️ SPS_APP_URL is not set. Payment page redirects will point at {DEFAULT_SPS_APP_URL}.");
            DEFAULT_SPS_APP_URL.into()
        });
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to \
                 the default configuration."
            );
            AuthConfig::default()
        });
        let midtrans = MidtransConfig::new_from_env_or_default();
        let use_x_forwarded_for = parse_boolean_flag(env::var("SPS_USE_X_FORWARDED_FOR").ok(), false);
        let use_forwarded = parse_boolean_flag(env::var("SPS_USE_FORWARDED").ok(), false);
        Self { host, port, database_url, app_url, auth, midtrans, use_x_forwarded_for, use_forwarded }
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The shared secret access tokens are signed with. Anyone who holds it can mint tokens.
    pub auth_secret: Secret<String>,
    /// How long a freshly issued token stays valid.
    pub token_lifetime: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        let mut tmpfile = NamedTempFile::new().ok().and_then(|f| f.keep().ok());
        warn!(
            "🚨️🚨️🚨️ The authentication secret has not been set. I'm using a random value for this session. Every \
             access token dies with this process. DO NOT operate on production like this. 🚨️🚨️🚨️"
        );
        let secret: String = thread_rng().sample_iter(&Alphanumeric).take(64).map(char::from).collect();
        match &mut tmpfile {
            Some((f, p)) => {
                let key_data = json!({ "auth_secret": secret }).to_string();
                match writeln!(f, "{key_data}") {
                    Ok(()) => warn!(
                        "🚨️🚨️🚨️ The authentication secret for this session was written to {}. If this is a \
                         production instance, you are doing it wrong! Set the SPS_AUTH_SECRET environment variable \
                         instead. 🚨️🚨️🚨️",
                        p.to_str().unwrap_or("???")
                    ),
                    Err(e) => warn!("🪛️ Could not write the authentication secret to the temporary file. {e}"),
                }
            },
            None => {
                warn!("🪛️ Could not create a temporary file to store the authentication secret. ");
            },
        }
        Self { auth_secret: Secret::new(secret), token_lifetime: DEFAULT_TOKEN_LIFETIME }
    }
}

impl AuthConfig {
    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret = env::var("SPS_AUTH_SECRET")
            .map_err(|e| ServerError::ConfigurationError(format!("{e} [SPS_AUTH_SECRET]")))?;
        if secret.len() < MIN_AUTH_SECRET_LEN {
            return Err(ServerError::ConfigurationError(format!(
                "SPS_AUTH_SECRET must be at least {MIN_AUTH_SECRET_LEN} characters long."
            )));
        }
        let token_lifetime = env::var("SPS_TOKEN_LIFETIME")
            .map_err(|_| {
                info!(
                    "🪛️ SPS_TOKEN_LIFETIME is not set. Using the default value of {} hrs.",
                    DEFAULT_TOKEN_LIFETIME.num_hours()
                )
            })
            .and_then(|s| {
                s.parse::<i64>()
                    .map(Duration::hours)
                    .map_err(|e| warn!("🪛️ Invalid configuration value for SPS_TOKEN_LIFETIME. {e}"))
            })
            .ok()
            .unwrap_or(DEFAULT_TOKEN_LIFETIME);
        Ok(Self { auth_secret: Secret::new(secret), token_lifetime })
    }
}

//-------------------------------------------------  ServerOptions  ----------------------------------------------------
/// A subset of the server configuration that is used to configure the server's behaviour. Generally we try to keep
/// this as small as possible, and exclude secrets to avoid passing sensitive information around the system.
#[derive(Clone, Copy, Debug)]
pub struct ServerOptions {
    pub use_x_forwarded_for: bool,
    pub use_forwarded: bool,
}

impl ServerOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self { use_x_forwarded_for: config.use_x_forwarded_for, use_forwarded: config.use_forwarded }
    }
}
