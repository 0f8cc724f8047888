//! Activation key service.
//!
//! Issues single-use activation keys, binds each redeemed key to one hardware id (HWID)
//! once the external confirmation bot reports it, and lets purchasers reset that HWID once
//! per cooldown window. A chat gateway forwards member commands to the HTTP routes built by
//! [`app`].
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Storage**: JSON documents per record set, behind a transactional store
//! - **Authentication**: gateway token with SHA-256 hashing, HMAC-signed confirmations
//! - **Authorization**: two role tiers checked through [`roles::RolePredicate`]

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod roles;
pub mod services;
pub mod state;
pub mod store;

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the HTTP router with every route and middleware.
pub fn app(state: AppState) -> Router {
    // Purchaser commands
    let purchaser_routes = Router::new()
        .route("/api/v1/keys/redeem", post(handlers::keys::redeem))
        .route("/api/v1/hwid", get(handlers::hwid::hwid_status))
        .route("/api/v1/hwid/reset", post(handlers::hwid::reset_hwid))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_purchaser,
        ));

    // Administrator commands
    let admin_routes = Router::new()
        .route("/api/v1/keys", get(handlers::keys::dump_keys))
        .route("/api/v1/keys/generate", post(handlers::keys::generate_keys))
        .route("/api/v1/keys/reset", post(handlers::keys::reset_keys))
        .route(
            "/api/v1/cooldowns/{principal}",
            delete(handlers::cooldowns::reset_cooldown),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_admin,
        ));

    // Identify the member before any tier check runs
    let command_routes = Router::new()
        .merge(purchaser_routes)
        .merge(admin_routes)
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware,
        ));

    let confirmation_routes = Router::new()
        .route(
            "/api/v1/confirmations",
            post(handlers::confirmations::receive_confirmation),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::gateway_auth,
        ));

    Router::new()
        // Public routes (no authentication required)
        .route("/health", get(handlers::health::health_check))
        .merge(command_routes)
        .merge(confirmation_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
