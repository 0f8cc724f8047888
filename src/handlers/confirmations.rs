//! Confirmation event handler.
//!
//! The gateway forwards every message it sees from the confirmation bot here.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

use crate::{
    error::AppError,
    middleware::signature::{SIGNATURE_HEADER, verify_signature},
    models::confirmation::{ConfirmationEvent, ConfirmationResponse},
    services::confirmation_service,
    state::AppState,
};

const ACKNOWLEDGEMENT: &str = "Understood, copied";

/// Handle a message from the confirmation bot.
///
/// # Endpoint
///
/// `POST /api/v1/confirmations`
///
/// # Response
///
/// - **204 No Content**: author is not the confirmation bot; nothing happened
/// - **200 OK**: acknowledged; `message`/`outcome` present only for a complete confirmation
///
/// ```json
/// {
///   "acknowledgement": "Understood, copied",
///   "message": "HWID for key 48213370915 has been updated.",
///   "outcome": { "outcome": "bound", "token": "48213370915" }
/// }
/// ```
///
/// # Security
///
/// - Requires the gateway token
/// - Requires `X-Confirmation-Signature` when a confirmation secret is configured
pub async fn receive_confirmation(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    if let Some(secret) = &state.confirmation_secret {
        let header = headers.get(SIGNATURE_HEADER).and_then(|h| h.to_str().ok());
        verify_signature(secret, &body, header)?;
    }

    let event: ConfirmationEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::InvalidRequest(format!("Invalid confirmation event: {e}")))?;

    if event.author_id != state.confirmation_author_id {
        tracing::debug!(author = %event.author_id, "Ignoring message from non-confirmation author");
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let Some(confirmation) = confirmation_service::parse_confirmation(&event.content) else {
        tracing::debug!("Confirmation message without all fields");
        return Ok(Json(ConfirmationResponse {
            acknowledgement: ACKNOWLEDGEMENT.to_string(),
            message: None,
            outcome: None,
        })
        .into_response());
    };

    let outcome = confirmation_service::apply_confirmation(&state.store, &confirmation).await?;

    Ok(Json(ConfirmationResponse {
        acknowledgement: ACKNOWLEDGEMENT.to_string(),
        message: Some(outcome.message()),
        outcome: Some(outcome),
    })
    .into_response())
}
