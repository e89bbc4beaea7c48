use std::future::{ready, Ready};

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use log::*;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use shop_common::Secret;

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

type HmacSha256 = Hmac<Sha256>;

/// What a verified access token says about its bearer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaims {
    pub user_id: i64,
    /// Expiry as a unix timestamp.
    pub exp: i64,
}

/// Issues and verifies the compact access tokens that guard the `/api` routes.
///
/// A token is `base64url(claims).base64url(hmac_sha256(claims))`. There is no login route on this
/// server; tokens are minted out of band by whatever issues customer sessions, using the shared
/// `SPS_AUTH_SECRET`.
#[derive(Clone)]
pub struct TokenIssuer {
    secret: Secret<String>,
    lifetime: Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        Self { secret: config.auth_secret.clone(), lifetime: config.token_lifetime }
    }

    pub fn issue_token(&self, user_id: i64) -> Result<String, ServerError> {
        let exp = (Utc::now() + self.lifetime).timestamp();
        let claims = UserClaims { user_id, exp };
        let body = serde_json::to_vec(&claims).map_err(|e| ServerError::CouldNotSerializeAccessToken(e.to_string()))?;
        let body = base64::encode_config(body, base64::URL_SAFE_NO_PAD);
        let signature = sign(self.secret.reveal(), body.as_bytes());
        trace!("🔑️ Issued access token for user {user_id}, valid for {} min", self.lifetime.num_minutes());
        Ok(format!("{body}.{signature}"))
    }

    /// Verifies the signature and expiry of a token and returns its claims.
    pub fn decode_token(&self, token: &str) -> Result<UserClaims, AuthError> {
        let (body, signature) =
            token.split_once('.').ok_or_else(|| AuthError::PoorlyFormattedToken("Missing signature".into()))?;
        let signature = base64::decode_config(signature, base64::URL_SAFE_NO_PAD)
            .map_err(|e| AuthError::PoorlyFormattedToken(e.to_string()))?;
        let mut mac = new_mac(self.secret.reveal());
        mac.update(body.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AuthError::ValidationError("signature has failed verification".into()))?;
        let body =
            base64::decode_config(body, base64::URL_SAFE_NO_PAD).map_err(|e| AuthError::PoorlyFormattedToken(e.to_string()))?;
        let claims: UserClaims =
            serde_json::from_slice(&body).map_err(|e| AuthError::PoorlyFormattedToken(e.to_string()))?;
        if claims.exp < Utc::now().timestamp() {
            return Err(AuthError::TokenExpired);
        }
        Ok(claims)
    }
}

fn new_mac(secret: &str) -> HmacSha256 {
    HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size")
}

fn sign(secret: &str, data: &[u8]) -> String {
    let mut mac = new_mac(secret);
    mac.update(data);
    base64::encode_config(mac.finalize().into_bytes(), base64::URL_SAFE_NO_PAD)
}

/// Handlers take `UserClaims` as an argument to require authentication. The token comes from the
/// `Authorization: Bearer` header and is verified against the issuer registered as app data.
impl FromRequest for UserClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(claims_from_request(req))
    }
}

fn claims_from_request(req: &HttpRequest) -> Result<UserClaims, ServerError> {
    let issuer = req
        .app_data::<web::Data<TokenIssuer>>()
        .ok_or_else(|| ServerError::InitializeError("No token issuer has been configured".into()))?;
    let header = req.headers().get("Authorization").ok_or(AuthError::MissingToken)?;
    let token = header.to_str().map_err(|e| AuthError::PoorlyFormattedToken(e.to_string()))?;
    let token = token.strip_prefix("Bearer ").unwrap_or(token).trim();
    let claims = issuer.decode_token(token).map_err(|e| {
        debug!("🔑️ Rejecting access token. {e}");
        e
    })?;
    trace!("🔑️ Request authenticated for user {}", claims.user_id);
    Ok(claims)
}
