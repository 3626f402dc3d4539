//! Inbound router — the `/api/bff/*` surface the frontend talks to.
//!
//! Pure pass-through: the handler rebuilds the downstream path + query,
//! forwards JSON and multipart bodies, and returns the raw downstream
//! status and body. The only transformation is the confidential
//! work-order filter applied to list responses on the way out.

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::{DefaultBodyLimit, Path, RawQuery, State};
use axum::http::{header, HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::{Json, Router};
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::errors::AppError;
use crate::proxy::dispatch::{dispatch, ProxyBody, ProxyRequest};
use crate::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route("/api/bff/*path", any(proxy_bff))
        .with_state(state)
        .layer(DefaultBodyLimit::max(25 * 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn proxy_bff(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
    method: Method,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    if !matches!(
        method,
        Method::GET | Method::POST | Method::PUT | Method::DELETE
    ) {
        return Ok(StatusCode::METHOD_NOT_ALLOWED.into_response());
    }

    let mut downstream_path = format!("/{path}");
    if let Some(q) = query {
        downstream_path = format!("{downstream_path}?{q}");
    }

    let req = ProxyRequest {
        method,
        body: parse_body(&headers, body)?,
        path: downstream_path,
    };

    tracing::info!(method = %req.method, path = %req.path, "proxying to FAST2");
    let upstream = dispatch(&state, &req).await?;

    // Confidential work orders never leave the BFF.
    if req.method == Method::GET && req.path.contains("/arbetsorder") {
        if let Ok(value @ Value::Array(_)) = serde_json::from_slice::<Value>(&upstream.body) {
            let filtered = filter_confidential(value);
            return Ok((upstream.status, Json(filtered)).into_response());
        }
    }

    let mut response = Response::builder().status(upstream.status);
    if let Some(ct) = upstream.content_type {
        response = response.header(header::CONTENT_TYPE, ct);
    }
    response
        .body(Body::from(upstream.body))
        .map_err(|e| AppError::Internal(e.into()))
}

fn parse_body(headers: &HeaderMap, body: Bytes) -> Result<ProxyBody, AppError> {
    if body.is_empty() {
        return Ok(ProxyBody::Empty);
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if content_type.starts_with("multipart/form-data") {
        return Ok(ProxyBody::Multipart {
            content_type: content_type.to_string(),
            payload: body,
        });
    }

    let value = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("expected JSON: {e}")))?;
    Ok(ProxyBody::Json(value))
}

/// Drop work orders marked confidential from a list response.
fn filter_confidential(value: Value) -> Value {
    match value {
        Value::Array(items) => {
            let before = items.len();
            let kept: Vec<Value> = items
                .into_iter()
                .filter(|wo| wo.get("externtNr").and_then(|v| v.as_str()) != Some("CONFIDENTIAL"))
                .collect();
            if kept.len() < before {
                tracing::debug!(
                    filtered = before - kept.len(),
                    "removed confidential work orders from list response"
                );
            }
            Value::Array(kept)
        }
        other => other,
    }
}
