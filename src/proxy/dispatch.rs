//! Authenticated request dispatch to the FAST2 API.
//!
//! Per logical request:
//! 1. Resolve a valid gateway token — and, for business endpoints, a session
//!    token — from the shared single-slot caches.
//! 2. Issue the downstream call with the credentials attached.
//! 3. If the response is an auth failure (401/403, or a 2xx/4xx body carrying
//!    one of the gateway's in-band error markers), clear both caches and
//!    re-issue the identical request exactly once. The second result is
//!    returned as-is.
//!
//! Transport errors are never retried, so a logical request makes at most two
//! physical downstream calls plus whatever token fetches the providers need.

use axum::http::{header, Method, StatusCode};
use bytes::Bytes;

use crate::auth::{gateway, session};
use crate::errors::AppError;
use crate::AppState;

/// Paths that are part of the auth flow itself. They must not require a
/// session token — login is how you get one.
const AUTH_ENDPOINTS: [&str; 4] = [
    "/auth/login",
    "/auth/refresh",
    "/auth/logout",
    "/auth/loginsso",
];

/// Substrings that mark a response body as an auth failure even when the
/// status code does not. `900901` is the WSO2 "invalid credentials" fault
/// code, which the gateway reports in-band.
const AUTH_FAILURE_MARKERS: [&str; 3] = ["Invalid JWT token", "Invalid Credentials", "900901"];

pub fn is_auth_endpoint(path: &str) -> bool {
    let path = path.split('?').next().unwrap_or(path);
    AUTH_ENDPOINTS.iter().any(|e| path.contains(e))
}

pub fn is_auth_failure(status: StatusCode, body: &[u8]) -> bool {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return true;
    }
    let text = String::from_utf8_lossy(body);
    AUTH_FAILURE_MARKERS.iter().any(|m| text.contains(m))
}

#[derive(Debug, Clone)]
pub enum ProxyBody {
    Empty,
    Json(serde_json::Value),
    /// Raw multipart payload, forwarded byte-for-byte with its original
    /// content type so the boundary parameter survives.
    Multipart {
        content_type: String,
        payload: Bytes,
    },
}

#[derive(Debug, Clone)]
pub struct ProxyRequest {
    /// Downstream path, query string included.
    pub path: String,
    pub method: Method,
    pub body: ProxyBody,
}

#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    /// Fully buffered: failure inspection must not consume the body the
    /// caller still wants to read.
    pub body: Bytes,
}

/// Issue `req` against the FAST2 API with credentials attached, retrying
/// once on auth failure.
pub async fn dispatch(state: &AppState, req: &ProxyRequest) -> Result<UpstreamResponse, AppError> {
    let config = &state.config;
    let auth_endpoint = is_auth_endpoint(&req.path);

    // Fail fast on missing session credentials before any network I/O.
    if !auth_endpoint {
        config.session_credentials()?;
    }

    let url = format!("{}{}", config.api_base_url, req.path);

    let mut attempt = 0;
    loop {
        let response = send_attempt(state, req, &url, auth_endpoint).await?;
        attempt += 1;

        if attempt >= 2 || !is_auth_failure(response.status, &response.body) {
            return Ok(response);
        }

        tracing::warn!(
            status = %response.status,
            path = %req.path,
            "auth failure from downstream, clearing token caches and retrying once"
        );
        state.caches.gateway.clear();
        state.caches.session.clear();
    }
}

async fn send_attempt(
    state: &AppState,
    req: &ProxyRequest,
    url: &str,
    auth_endpoint: bool,
) -> Result<UpstreamResponse, AppError> {
    let client = state.upstream.inner();
    let config = &state.config;

    let gateway = gateway::get_valid_token(client, config, &state.caches.gateway).await?;
    let mut builder = client
        .request(req.method.clone(), url)
        .bearer_auth(&gateway.access_token);

    if !auth_endpoint {
        // Session acquisition re-consults the gateway cache internally; the
        // token fetched above is reused, not duplicated.
        let session = session::get_valid_token(client, config, &state.caches).await?;
        builder = builder.header("X-Auth-Token", &session.access_token);
    }

    builder = match &req.body {
        ProxyBody::Empty => builder,
        ProxyBody::Json(value) => builder.json(value),
        ProxyBody::Multipart {
            content_type,
            payload,
        } => builder
            .header(header::CONTENT_TYPE, content_type)
            .body(payload.clone()),
    };

    let resp = builder
        .send()
        .await
        .map_err(|e| AppError::Transport(e.to_string()))?;

    let status = resp.status();
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let body = resp
        .bytes()
        .await
        .map_err(|e| AppError::Transport(e.to_string()))?;

    Ok(UpstreamResponse {
        status,
        content_type,
        body,
    })
}
