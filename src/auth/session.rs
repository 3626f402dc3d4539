//! Username/password session tokens for the FAST2 business API.
//!
//! The login and refresh calls themselves go through the gateway, so both
//! resolve a valid gateway token first and present it as a bearer header.
//! Unlike the gateway tier, no expiry buffer is applied here: the session
//! token's advertised expiry is authoritative.
//!
//! The automatic path ([`get_valid_token`]) always performs a fresh
//! username/password login when the cached token has expired. [`refresh`]
//! exists for callers that hold a refresh token, but is deliberately not
//! wired into the automatic path: a fresh login cannot go stale the way a
//! stored refresh token can.

use serde::Deserialize;
use serde_json::json;

use crate::auth::cache::TokenCaches;
use crate::auth::gateway;
use crate::config::Config;
use crate::errors::AppError;

pub const LOGIN_PATH: &str = "/ao-produkt/v1/auth/login";
pub const REFRESH_PATH: &str = "/ao-produkt/v1/auth/refresh";

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSessionToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub refresh_token: String,
    /// Stamped locally when the token response arrives (epoch ms).
    #[serde(skip)]
    pub obtained_at: i64,
}

pub(crate) fn is_expired_at(token: Option<&ApiSessionToken>, now_ms: i64) -> bool {
    let Some(token) = token else { return true };
    now_ms >= token.obtained_at + token.expires_in * 1000
}

/// Strict comparison against the advertised expiry, no buffer.
pub fn is_expired(token: Option<&ApiSessionToken>) -> bool {
    is_expired_at(token, chrono::Utc::now().timestamp_millis())
}

/// Log in with username/password. Requires a valid gateway token, which is
/// resolved (and cached) through the gateway tier first.
pub async fn login(
    client: &reqwest::Client,
    config: &Config,
    caches: &TokenCaches,
) -> Result<ApiSessionToken, AppError> {
    let (username, password) = config.session_credentials()?;
    let gateway = gateway::get_valid_token(client, config, &caches.gateway).await?;

    let url = format!("{}{}", config.api_base_url, LOGIN_PATH);
    let resp = client
        .post(&url)
        .bearer_auth(&gateway.access_token)
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .map_err(|e| AppError::Transport(e.to_string()))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(AppError::ApiLogin {
            status: status.as_u16(),
            body,
        });
    }

    let mut token: ApiSessionToken = resp
        .json()
        .await
        .map_err(|e| AppError::Transport(e.to_string()))?;
    token.obtained_at = chrono::Utc::now().timestamp_millis();
    tracing::info!(expires_in = token.expires_in, "logged in to FAST2 API");
    Ok(token)
}

/// Renew a session via its refresh token. Same gateway prerequisite as
/// [`login`]; not called by [`get_valid_token`].
pub async fn refresh(
    client: &reqwest::Client,
    refresh_token: &str,
    config: &Config,
    caches: &TokenCaches,
) -> Result<ApiSessionToken, AppError> {
    let gateway = gateway::get_valid_token(client, config, &caches.gateway).await?;

    let url = format!("{}{}", config.api_base_url, REFRESH_PATH);
    let resp = client
        .post(&url)
        .bearer_auth(&gateway.access_token)
        .json(&json!({ "refresh_token": refresh_token }))
        .send()
        .await
        .map_err(|e| AppError::Transport(e.to_string()))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(AppError::ApiRefresh {
            status: status.as_u16(),
            body,
        });
    }

    let mut token: ApiSessionToken = resp
        .json()
        .await
        .map_err(|e| AppError::Transport(e.to_string()))?;
    token.obtained_at = chrono::Utc::now().timestamp_millis();
    Ok(token)
}

/// Cached session token if still valid, otherwise a fresh login.
pub async fn get_valid_token(
    client: &reqwest::Client,
    config: &Config,
    caches: &TokenCaches,
) -> Result<ApiSessionToken, AppError> {
    if let Some(token) = caches.session.get() {
        if !is_expired(Some(&token)) {
            tracing::debug!("using cached session token");
            return Ok(token);
        }
    }

    tracing::info!("session token missing or expired, logging in again");
    let token = login(client, config, caches).await?;
    caches.session.set(token.clone());
    Ok(token)
}
