//! Two-tier credential management for the FAST2 API.
//!
//! Tier 1 ([`gateway`]) authenticates against the WSO2 API gateway with an
//! OAuth2 client-credentials grant. Tier 2 ([`session`]) logs into the
//! business API with username/password — a call that itself must pass the
//! gateway, so tier 2 always resolves tier 1 first. Both tokens live in
//! single-slot caches ([`cache`]) owned by the application state.

pub mod cache;
pub mod gateway;
pub mod session;
