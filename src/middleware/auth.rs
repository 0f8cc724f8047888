//! Gateway authentication and role middleware.
//!
//! This middleware intercepts every protected request to:
//! 1. Extract the gateway token from the Authorization header
//! 2. Hash it and compare it to the configured token hash
//! 3. Read the invoking principal and their role ids
//! 4. Inject authentication context into the request
//! 5. Reject requests whose principal lacks the tier the route requires

use crate::{
    error::AppError,
    roles::Role,
    state::{AppState, hash_token},
};
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

/// Header carrying the id of the chat member who issued the command.
pub const PRINCIPAL_HEADER: &str = "X-Principal-Id";

/// Header carrying the member's role ids, comma-separated.
pub const ROLES_HEADER: &str = "X-Principal-Roles";

/// Authentication context attached to authenticated requests.
///
/// This struct is inserted into the request's extension map and can be
/// extracted by route handlers to know who issued the command.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Platform id of the invoking member
    pub principal: String,

    /// Role ids the member holds, as reported by the gateway
    pub role_ids: Vec<String>,
}

/// Check `Authorization: Bearer <token>` against the configured gateway token.
fn verify_gateway_token(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    let token = headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(AppError::InvalidGatewayToken)?;

    if hash_token(token) != state.gateway_token_hash {
        tracing::warn!("Rejected request with wrong gateway token");
        return Err(AppError::InvalidGatewayToken);
    }

    Ok(())
}

/// Gateway-only authentication, for events that are not issued by a member.
pub async fn gateway_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    verify_gateway_token(&state, request.headers())?;
    Ok(next.run(request).await)
}

/// Command authentication middleware function.
///
/// # Flow
///
/// 1. Verify the gateway token
/// 2. Read `X-Principal-Id` (required) and `X-Principal-Roles` (optional)
/// 3. Inject `AuthContext` into request, call next handler
///
/// # Headers
///
/// ```text
/// Authorization: Bearer <gateway token>
/// X-Principal-Id: 1272776413908308041
/// X-Principal-Roles: 1272776413908308041,1272804155433422931
/// ```
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    verify_gateway_token(&state, request.headers())?;

    let principal = request
        .headers()
        .get(PRINCIPAL_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::InvalidRequest(format!("Missing {PRINCIPAL_HEADER} header")))?
        .to_string();

    let role_ids: Vec<String> = request
        .headers()
        .get(ROLES_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(|roles| {
            roles
                .split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    // Route handlers can now extract this using Extension<AuthContext>
    request.extensions_mut().insert(AuthContext {
        principal,
        role_ids,
    });

    Ok(next.run(request).await)
}

fn require_role(state: &AppState, request: &Request, role: Role) -> Result<(), AppError> {
    let auth = request
        .extensions()
        .get::<AuthContext>()
        .ok_or(AppError::Unauthorized)?;

    if !state.roles.has_role(auth, role) {
        tracing::warn!(principal = %auth.principal, ?role, "Command rejected: missing role");
        return Err(AppError::Unauthorized);
    }

    Ok(())
}

/// Allow only members holding the purchaser role. Runs after `auth_middleware`.
pub async fn require_purchaser(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    require_role(&state, &request, Role::Purchaser)?;
    Ok(next.run(request).await)
}

/// Allow only members holding the administrator role. Runs after `auth_middleware`.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    require_role(&state, &request, Role::Administrator)?;
    Ok(next.run(request).await)
}
