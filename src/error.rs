//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::time::Duration;

use crate::models::cooldown::CooldownRemaining;
use crate::store::StoreError;

/// Rejections raised by the key registry.
///
/// These protect the key lifecycle invariants; none of them is a system fault.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    /// The token was never generated.
    #[error("Key {0} does not exist.")]
    NotFound(String),

    /// The token was already consumed by a redemption.
    #[error("Key {0} has already been redeemed.")]
    AlreadyRedeemed(String),

    /// The key is not waiting for a HWID (unredeemed, or already bound).
    #[error("Key {0} already has a HWID or has not been redeemed.")]
    AlreadyBound(String),

    /// The principal has no redeemed key to operate on.
    #[error("You have not redeemed any keys.")]
    NoBinding,
}

/// Application-wide error type.
///
/// This enum represents all possible errors that can occur in the application.
/// Each variant maps to a specific HTTP status code and error message.
///
/// # Error Categories
///
/// - **Persistence Errors**: the store could not be read or written
/// - **Key Errors**: key lifecycle rejections (see `KeyError`)
/// - **Rate Limit Errors**: HWID reset attempted during the cooldown window
/// - **Authentication Errors**: bad gateway token or confirmation signature
/// - **Authorization Errors**: principal lacks the required role
/// - **Validation Errors**: invalid request data
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Store I/O or a malformed record set.
    ///
    /// Returns HTTP 500 without details; the cause is logged.
    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),

    #[error(transparent)]
    Key(#[from] KeyError),

    /// HWID reset requested before the cooldown window elapsed.
    ///
    /// Returns HTTP 429 Too Many Requests.
    #[error(
        "You need to wait {} before using this command again.",
        CooldownRemaining::from(.remaining)
    )]
    StillCooling { remaining: Duration },

    /// Gateway bearer token is missing or wrong.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Invalid gateway token")]
    InvalidGatewayToken,

    /// Confirmation event signature is missing or wrong.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Invalid confirmation signature")]
    InvalidSignature,

    /// Principal does not hold the role the command requires.
    ///
    /// Returns HTTP 403 Forbidden.
    #[error("You do not have permission to use this command.")]
    Unauthorized,

    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    /// The String contains details about what was invalid.
    #[error("Invalid request")]
    InvalidRequest(String),
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// ```json
/// {
///   "error": {
///     "code": "already_redeemed",
///     "message": "Key 48213370915 has already been redeemed."
///   }
/// }
/// ```
///
/// # Status Code Mapping
///
/// - `NotFound`, `NoBinding` → 404 Not Found
/// - `AlreadyRedeemed`, `AlreadyBound` → 409 Conflict
/// - `StillCooling` → 429 Too Many Requests
/// - `InvalidGatewayToken`, `InvalidSignature` → 401 Unauthorized
/// - `Unauthorized` → 403 Forbidden
/// - `InvalidRequest` → 400 Bad Request
/// - `Persistence` → 500 Internal Server Error (hides details from client)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Key(KeyError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "key_not_found", self.to_string())
            }
            AppError::Key(KeyError::NoBinding) => {
                (StatusCode::NOT_FOUND, "no_binding", self.to_string())
            }
            AppError::Key(KeyError::AlreadyRedeemed(_)) => {
                (StatusCode::CONFLICT, "already_redeemed", self.to_string())
            }
            AppError::Key(KeyError::AlreadyBound(_)) => {
                (StatusCode::CONFLICT, "already_bound", self.to_string())
            }
            AppError::StillCooling { .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                "still_cooling",
                self.to_string(),
            ),
            AppError::InvalidGatewayToken => (
                StatusCode::UNAUTHORIZED,
                "invalid_gateway_token",
                self.to_string(),
            ),
            AppError::InvalidSignature => (
                StatusCode::UNAUTHORIZED,
                "invalid_signature",
                self.to_string(),
            ),
            AppError::Unauthorized => (StatusCode::FORBIDDEN, "unauthorized", self.to_string()),
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::Persistence(e) => {
                tracing::error!("Persistence fault: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn still_cooling_message_shows_remaining_time() {
        let err = AppError::StillCooling {
            remaining: Duration::from_secs(3 * 3600 + 4 * 60 + 5),
        };
        assert_eq!(
            err.to_string(),
            "You need to wait 3 hours, 4 minutes, and 5 seconds before using this command again."
        );
    }

    #[test]
    fn status_codes() {
        let cases = [
            (
                AppError::Key(KeyError::NotFound("1".into())),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::Key(KeyError::AlreadyRedeemed("1".into())),
                StatusCode::CONFLICT,
            ),
            (
                AppError::StillCooling {
                    remaining: Duration::from_secs(1),
                },
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (AppError::Unauthorized, StatusCode::FORBIDDEN),
            (AppError::InvalidGatewayToken, StatusCode::UNAUTHORIZED),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
