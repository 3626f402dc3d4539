use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("missing configuration: {0}")]
    Configuration(String),

    #[error("gateway token request failed: {status} {body}")]
    GatewayAuth { status: u16, body: String },

    #[error("api login failed: {status} {body}")]
    ApiLogin { status: u16, body: String },

    #[error("api token refresh failed: {status} {body}")]
    ApiRefresh { status: u16, body: String },

    #[error("invalid request body: {0}")]
    BadRequest(String),

    #[error("upstream transport error: {0}")]
    Transport(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, code, msg) = match &self {
            AppError::Configuration(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "configuration_error",
                "missing_configuration",
                self.to_string(),
            ),
            AppError::GatewayAuth { .. } => (
                StatusCode::BAD_GATEWAY,
                "authentication_error",
                "gateway_token_failed",
                self.to_string(),
            ),
            AppError::ApiLogin { .. } => (
                StatusCode::BAD_GATEWAY,
                "authentication_error",
                "api_login_failed",
                self.to_string(),
            ),
            AppError::ApiRefresh { .. } => (
                StatusCode::BAD_GATEWAY,
                "authentication_error",
                "api_refresh_failed",
                self.to_string(),
            ),
            AppError::BadRequest(_) => (
                StatusCode::BAD_REQUEST,
                "invalid_request_error",
                "invalid_body",
                self.to_string(),
            ),
            AppError::Transport(e) => (
                StatusCode::BAD_GATEWAY,
                "upstream_error",
                "transport_failed",
                e.clone(),
            ),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal_server_error",
                    "internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "message": msg,
                "type": error_type,
                "code": code,
            }
        }));

        (status, body).into_response()
    }
}
