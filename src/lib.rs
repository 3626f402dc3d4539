//! Felanmälan BFF — authenticated proxy in front of the FAST2 property
//! management API.
//!
//! The FAST2 API sits behind a WSO2-style gateway that requires two
//! credentials on every business call:
//! 1. An OAuth2 client-credentials token for the gateway itself
//!    (`Authorization: Bearer …`), managed by [`auth::gateway`].
//! 2. A session token obtained via username/password login
//!    (`X-Auth-Token: …`), managed by [`auth::session`].
//!
//! [`proxy::dispatch`] attaches both, detects externally-invalidated tokens
//! in downstream responses and transparently retries once after clearing the
//! caches. [`api`] exposes the inbound `/api/bff/*` route the frontend talks
//! to.

pub mod api;
pub mod auth;
pub mod config;
pub mod errors;
pub mod proxy;

/// Shared application state passed to handlers.
pub struct AppState {
    pub config: config::Config,
    pub upstream: proxy::upstream::UpstreamClient,
    pub caches: auth::cache::TokenCaches,
}
