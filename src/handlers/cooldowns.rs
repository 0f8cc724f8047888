//! Cooldown administration handler.

use crate::{
    error::AppError, middleware::auth::AuthContext, models::CommandResponse,
    services::cooldown_service, state::AppState,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
};

/// Clear a member's HWID reset cooldown.
///
/// # Endpoint
///
/// `DELETE /api/v1/cooldowns/{principal}`
///
/// Always 200; the message says whether there was a cooldown to clear.
pub async fn reset_cooldown(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(principal): Path<String>,
) -> Result<Json<CommandResponse>, AppError> {
    let cleared = cooldown_service::admin_clear(&state.store, &principal).await?;
    tracing::info!(admin = %auth.principal, member = %principal, cleared, "Cooldown reset requested");

    let message = if cleared {
        format!("{principal}'s cooldown has been reset.")
    } else {
        format!("{principal} has no cooldown to reset.")
    };

    Ok(Json(CommandResponse::new(message)))
}
