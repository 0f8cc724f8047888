//! HWID command handlers.
//!
//! - GET /api/v1/hwid - Show the HWID locked to the member's key
//! - POST /api/v1/hwid/reset - Clear that HWID, once per cooldown window

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::{CommandResponse, key::HwidStatusResponse},
    services::key_service,
    state::AppState,
};
use axum::{Extension, Json, extract::State};
use chrono::Utc;

/// Report the member's binding status.
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "message": "Your HWID associated with the key 48213370915 is: 4F2A-99B1",
///   "status": "bound",
///   "token": "48213370915",
///   "hwid": "4F2A-99B1"
/// }
/// ```
pub async fn hwid_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<HwidStatusResponse>, AppError> {
    let status = key_service::query_status(&state.store, &auth.principal).await?;

    Ok(Json(HwidStatusResponse {
        message: status.message(),
        status,
    }))
}

/// Clear the HWID of the member's key.
///
/// # Response
///
/// - **Success (200 OK)**: `{"message": "Your HWID has been reset."}`
/// - **Error (429)**: Still on cooldown; the message says how long is left
/// - **Error (404)**: Member has not redeemed a key
pub async fn reset_hwid(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<CommandResponse>, AppError> {
    state
        .cooldown
        .reset_hwid(&state.store, &auth.principal, Utc::now())
        .await?;

    Ok(Json(CommandResponse::new("Your HWID has been reset.")))
}
