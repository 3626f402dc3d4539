use crate::errors::AppError;

/// Immutable configuration, validated once at startup.
///
/// Base URL, token endpoint and consumer key/secret are required up front;
/// username/password are only required for business-API calls and are
/// checked per request by the dispatcher.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the FAST2 API gateway, without trailing slash.
    pub api_base_url: String,
    /// OAuth2 token endpoint. Defaults to `{api_base_url}/oauth2/token`.
    pub token_endpoint: String,
    pub consumer_key: String,
    pub consumer_secret: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub port: u16,
}

impl Config {
    /// Username/password pair for the session-token login.
    /// Fails with a configuration error if either is missing.
    pub fn session_credentials(&self) -> Result<(&str, &str), AppError> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(u), Some(p)) => Ok((u, p)),
            _ => Err(AppError::Configuration(
                "FAST2_USERNAME / FAST2_PASSWORD are required for business-API calls".into(),
            )),
        }
    }
}

pub fn load() -> Result<Config, AppError> {
    dotenvy::dotenv().ok();

    let api_base_url = require("FAST2_BASE_URL")?
        .trim_end_matches('/')
        .to_string();

    Ok(Config {
        token_endpoint: std::env::var("FAST2_TOKEN_ENDPOINT")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| format!("{}/oauth2/token", api_base_url)),
        consumer_key: require("FAST2_CONSUMER_KEY")?,
        consumer_secret: require("FAST2_CONSUMER_SECRET")?,
        username: std::env::var("FAST2_USERNAME").ok().filter(|v| !v.is_empty()),
        password: std::env::var("FAST2_PASSWORD").ok().filter(|v| !v.is_empty()),
        port: std::env::var("BFF_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8080),
        api_base_url,
    })
}

fn require(key: &str) -> Result<String, AppError> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Configuration(format!("{key} is not set")))
}
