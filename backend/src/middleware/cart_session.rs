//! Signed cart cookie
//!
//! The cart id travels as `<uuid>.<base64url(HMAC-SHA256(secret, uuid))>`.
//! Unsigned or tampered values are treated as if no cart existed.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderValue},
};
use axum_extra::{headers::Cookie, TypedHeader};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::convert::Infallible;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::AppState;

type HmacSha256 = Hmac<Sha256>;

fn mac_for(secret: &str) -> AppResult<HmacSha256> {
    HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| AppError::Internal("Failed to create HMAC".to_string()))
}

/// Cookie value for a cart id
pub fn sign_cart_id(secret: &str, cart_id: Uuid) -> AppResult<String> {
    let id = cart_id.to_string();
    let mut mac = mac_for(secret)?;
    mac.update(id.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
    Ok(format!("{}.{}", id, signature))
}

/// Cart id from a cookie value, if the signature checks out
pub fn verify_cart_cookie(secret: &str, value: &str) -> Option<Uuid> {
    let (id, signature) = value.split_once('.')?;
    let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;
    let mut mac = mac_for(secret).ok()?;
    mac.update(id.as_bytes());
    mac.verify_slice(&signature).ok()?;
    Uuid::parse_str(id).ok()
}

fn cookie_attributes(config: &Config, max_age_secs: i64) -> String {
    let mut attributes = format!("Path=/; Max-Age={}; HttpOnly; SameSite=Lax", max_age_secs);
    if config.is_production() {
        attributes.push_str("; Secure");
    }
    attributes
}

/// Set-Cookie header carrying a signed cart id
pub fn cart_cookie(config: &Config, cart_id: Uuid) -> AppResult<HeaderValue> {
    let storefront = &config.storefront;
    let value = sign_cart_id(&storefront.cookie_secret, cart_id)?;
    let max_age = storefront.cart_cookie_max_age_days * 24 * 60 * 60;
    let header = format!(
        "{}={}; {}",
        storefront.cart_cookie_name,
        value,
        cookie_attributes(config, max_age)
    );
    HeaderValue::from_str(&header)
        .map_err(|e| AppError::Internal(format!("Invalid cart cookie: {}", e)))
}

/// Set-Cookie header that removes the cart cookie
pub fn clear_cart_cookie(config: &Config) -> AppResult<HeaderValue> {
    let header = format!(
        "{}=; {}",
        config.storefront.cart_cookie_name,
        cookie_attributes(config, 0)
    );
    HeaderValue::from_str(&header)
        .map_err(|e| AppError::Internal(format!("Invalid cart cookie: {}", e)))
}

/// Cart id carried by the request, if any
#[derive(Debug, Clone, Copy, Default)]
pub struct CartSession {
    pub cart_id: Option<Uuid>,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CartSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let cookies = match TypedHeader::<Cookie>::from_request_parts(parts, state).await {
            Ok(TypedHeader(cookies)) => cookies,
            Err(_) => return Ok(CartSession::default()),
        };

        let storefront = &state.config.storefront;
        let cart_id = cookies
            .get(&storefront.cart_cookie_name)
            .and_then(|value| verify_cart_cookie(&storefront.cookie_secret, value));

        if cart_id.is_none() && cookies.get(&storefront.cart_cookie_name).is_some() {
            tracing::warn!("Ignoring cart cookie with an invalid signature");
        }

        Ok(CartSession { cart_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_cookie_verifies() {
        let id = Uuid::new_v4();
        let value = sign_cart_id("secret", id).unwrap();
        assert_eq!(verify_cart_cookie("secret", &value), Some(id));
    }

    #[test]
    fn test_tampered_cookie_is_ignored() {
        let id = Uuid::new_v4();
        let value = sign_cart_id("secret", id).unwrap();
        let (_, signature) = value.split_once('.').unwrap();
        let forged = format!("{}.{}", Uuid::new_v4(), signature);

        assert_eq!(verify_cart_cookie("secret", &forged), None);
        assert_eq!(verify_cart_cookie("other-secret", &value), None);
        assert_eq!(verify_cart_cookie("secret", &id.to_string()), None);
    }
}
