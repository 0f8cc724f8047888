//! HTTP middleware components.
//!
//! Middleware are functions that run before route handlers.
//! They can:
//! - Authenticate the gateway
//! - Identify the invoking member and check their tier
//! - Short-circuit requests (reject unauthorized)

/// Gateway token, principal and role middleware
pub mod auth;
/// Confirmation event signatures
pub mod signature;
