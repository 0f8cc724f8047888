//! Confirmation workflow - second phase of HWID binding.
//!
//! Redemption leaves a key waiting for its HWID. The external confirmation bot later posts
//! a message naming the key and the client's hardware id; this service pulls the three
//! labelled fields out of that text and binds the HWID.
//!
//! A message missing any of the fields is not a confirmation and is ignored.

use regex::Regex;
use std::sync::LazyLock;

use crate::{
    error::{AppError, KeyError},
    models::confirmation::{Confirmation, ConfirmationOutcome},
    services::key_service,
    store::Store,
};

static USER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"User:\s*(\S+)").expect("user pattern is valid"));

static CLIENT_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Client ID:\s*([\w-]+)").expect("client id pattern is valid"));

static SCRIPT_KEY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Script Key:\s*(\S+)").expect("script key pattern is valid"));

fn capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extract `User:`, `Client ID:` and `Script Key:` from `text`.
///
/// Returns `None` unless all three are present.
pub fn parse_confirmation(text: &str) -> Option<Confirmation> {
    Some(Confirmation {
        user: capture(&USER_PATTERN, text)?,
        client_id: capture(&CLIENT_ID_PATTERN, text)?,
        script_key: capture(&SCRIPT_KEY_PATTERN, text)?,
    })
}

/// Bind the confirmed client id to the confirmed key.
///
/// Key rejections become outcomes so the caller can report them; only persistence
/// faults are returned as errors.
pub async fn apply_confirmation(
    store: &Store,
    confirmation: &Confirmation,
) -> Result<ConfirmationOutcome, AppError> {
    let token = confirmation.script_key.clone();

    match key_service::bind_hwid(store, &token, &confirmation.client_id).await {
        Ok(()) => Ok(ConfirmationOutcome::Bound { token }),
        Err(AppError::Key(KeyError::AlreadyBound(_))) => {
            tracing::warn!(token = %token, user = %confirmation.user, "Confirmation for key without pending HWID");
            Ok(ConfirmationOutcome::AlreadyBound { token })
        }
        Err(AppError::Key(KeyError::NotFound(_))) => {
            tracing::warn!(token = %token, user = %confirmation.user, "Confirmation for unknown key");
            Ok(ConfirmationOutcome::NotFound { token })
        }
        Err(e) => Err(e),
    }
}
