//! OAuth2 client-credentials tokens for the WSO2 API gateway.
//!
//! Every FAST2 call goes through the gateway, which wants its own bearer
//! token independent of the business-API session. Tokens are cached in a
//! single slot and treated as expired 60 s before their advertised
//! `expires_in`: WSO2-style gateways commonly start returning 401 slightly
//! ahead of the nominal expiry.

use base64::Engine;
use serde::Deserialize;

use crate::auth::cache::TokenSlot;
use crate::config::Config;
use crate::errors::AppError;

/// Lead time subtracted from the advertised expiry.
pub const EXPIRY_BUFFER_SECS: i64 = 60;

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayToken {
    pub access_token: String,
    pub token_type: String,
    #[serde(default)]
    pub scope: String,
    pub expires_in: i64,
    /// Stamped locally when the token response arrives (epoch ms).
    #[serde(skip)]
    pub obtained_at: i64,
}

/// `Basic base64(key:secret)` header value for the token endpoint.
pub fn basic_auth_header(consumer_key: &str, consumer_secret: &str) -> String {
    let credentials = format!("{consumer_key}:{consumer_secret}");
    format!(
        "Basic {}",
        base64::engine::general_purpose::STANDARD.encode(credentials)
    )
}

pub(crate) fn is_expired_at(token: Option<&GatewayToken>, now_ms: i64, buffer_secs: i64) -> bool {
    let Some(token) = token else { return true };
    let expires_at = token.obtained_at + token.expires_in * 1000;
    now_ms >= expires_at - buffer_secs * 1000
}

/// A missing token is always expired.
pub fn is_expired(token: Option<&GatewayToken>) -> bool {
    is_expired_at(token, chrono::Utc::now().timestamp_millis(), EXPIRY_BUFFER_SECS)
}

/// Exchange consumer key/secret for a gateway token.
pub async fn obtain_token(
    client: &reqwest::Client,
    token_endpoint: &str,
    consumer_key: &str,
    consumer_secret: &str,
) -> Result<GatewayToken, AppError> {
    let resp = client
        .post(token_endpoint)
        .header(
            reqwest::header::AUTHORIZATION,
            basic_auth_header(consumer_key, consumer_secret),
        )
        .form(&[("grant_type", "client_credentials")])
        .send()
        .await
        .map_err(|e| AppError::Transport(e.to_string()))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(AppError::GatewayAuth {
            status: status.as_u16(),
            body,
        });
    }

    let mut token: GatewayToken = resp
        .json()
        .await
        .map_err(|e| AppError::Transport(e.to_string()))?;
    token.obtained_at = chrono::Utc::now().timestamp_millis();
    Ok(token)
}

/// Cached token if still valid, otherwise a fresh fetch.
///
/// Check-then-fetch is not atomic across concurrent callers; see
/// [`crate::auth::cache::TokenSlot`].
pub async fn get_valid_token(
    client: &reqwest::Client,
    config: &Config,
    cache: &TokenSlot<GatewayToken>,
) -> Result<GatewayToken, AppError> {
    if let Some(token) = cache.get() {
        if !is_expired(Some(&token)) {
            tracing::debug!("using cached gateway token");
            return Ok(token);
        }
    }

    tracing::info!("gateway token missing or expired, requesting a new one");
    let token = obtain_token(
        client,
        &config.token_endpoint,
        &config.consumer_key,
        &config.consumer_secret,
    )
    .await?;
    cache.set(token.clone());
    Ok(token)
}
