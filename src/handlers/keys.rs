//! Key command handlers.
//!
//! This module implements the key-related commands:
//! - POST /api/v1/keys/redeem - Redeem a key (purchaser)
//! - POST /api/v1/keys/generate - Generate new keys (administrator)
//! - GET /api/v1/keys - Dump every key (administrator)
//! - POST /api/v1/keys/reset - Return every key to unredeemed (administrator)

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::{
        CommandResponse,
        key::{DumpKeysResponse, GenerateKeysRequest, GenerateKeysResponse, RedeemRequest},
    },
    services::key_service,
    state::AppState,
};
use axum::{Extension, Json, extract::State};

/// Redeem a key for the invoking member.
///
/// # Request Body
///
/// ```json
/// { "token": "48213370915" }
/// ```
///
/// # Response
///
/// - **Success (200 OK)**: `{"message": "Successfully redeemed key 48213370915!"}`
/// - **Error (404)**: Key does not exist
/// - **Error (409)**: Key already redeemed
pub async fn redeem(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<RedeemRequest>,
) -> Result<Json<CommandResponse>, AppError> {
    let token = request.token.trim();

    key_service::redeem_key(&state.store, token, &auth.principal).await?;

    Ok(Json(CommandResponse::new(format!(
        "Successfully redeemed key {token}!"
    ))))
}

/// Generate keys and hand them back for private delivery to the requesting admin.
///
/// # Request Body
///
/// ```json
/// { "count": 5 }
/// ```
///
/// # Validation
///
/// - `count` must be between 1 and the configured maximum
pub async fn generate_keys(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<GenerateKeysRequest>,
) -> Result<Json<GenerateKeysResponse>, AppError> {
    let count = usize::try_from(request.count)
        .ok()
        .filter(|&n| n >= 1)
        .ok_or_else(|| {
            AppError::InvalidRequest(
                "Please provide a valid number of keys to generate.".to_string(),
            )
        })?;

    if count > state.max_generate {
        return Err(AppError::InvalidRequest(format!(
            "You can generate at most {} keys at once.",
            state.max_generate
        )));
    }

    let keys = key_service::generate_keys(&state.store, count, state.key_length).await?;
    tracing::info!(admin = %auth.principal, count, "Keys generated on request");

    let message = keys
        .iter()
        .map(|key| format!("Generated key: {key}"))
        .collect::<Vec<_>>()
        .join("\n");

    Ok(Json(GenerateKeysResponse {
        message,
        deliver_to: auth.principal,
        keys,
    }))
}

/// Dump every key and its state for private delivery to the requesting admin.
///
/// The `message` field is one `<token>: <state>` line per key.
pub async fn dump_keys(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<DumpKeysResponse>, AppError> {
    let keys = key_service::dump_keys(&state.store).await?;

    let lines = keys
        .iter()
        .map(|entry| format!("{}: {}", entry.token, entry.state))
        .collect::<Vec<_>>()
        .join("\n");

    Ok(Json(DumpKeysResponse {
        message: format!("Here are the current keys:\n{lines}"),
        deliver_to: auth.principal,
        keys,
    }))
}

/// Return every key to unredeemed.
///
/// Bindings and cooldowns are not touched.
pub async fn reset_keys(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<CommandResponse>, AppError> {
    let count = key_service::reset_all_keys(&state.store).await?;
    tracing::warn!(admin = %auth.principal, count, "Bulk key reset requested");

    Ok(Json(CommandResponse::new("All keys have been reset.")))
}
