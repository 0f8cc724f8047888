//! Confirmation event models.
//!
//! The external confirmation bot posts a free-form message such as:
//!
//! ```text
//! Whitelist request
//! User: roblox_name
//! Client ID: 4F2A-99B1-C0DE
//! Script Key: 48213370915
//! ```
//!
//! The gateway forwards every message from that bot to `POST /api/v1/confirmations`.

use serde::{Deserialize, Serialize};

/// Inbound message forwarded by the gateway.
///
/// # JSON Example
///
/// ```json
/// {
///   "author_id": "1281744707323695156",
///   "content": "User: roblox_name\nClient ID: 4F2A-99B1\nScript Key: 48213370915"
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct ConfirmationEvent {
    pub author_id: String,
    pub content: String,
}

/// The three correlated fields extracted from a confirmation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Confirmation {
    /// Username on the external platform. Informational only.
    pub user: String,

    /// Hardware fingerprint to lock the key to.
    pub client_id: String,

    /// Token of the key being bound.
    pub script_key: String,
}

/// Result of applying a complete confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ConfirmationOutcome {
    Bound { token: String },
    AlreadyBound { token: String },
    NotFound { token: String },
}

impl ConfirmationOutcome {
    pub fn message(&self) -> String {
        match self {
            ConfirmationOutcome::Bound { token } => {
                format!("HWID for key {token} has been updated.")
            }
            ConfirmationOutcome::AlreadyBound { token } => {
                format!("Key {token} already has a HWID or has not been redeemed.")
            }
            ConfirmationOutcome::NotFound { token } => format!("Key {token} is not valid."),
        }
    }
}

/// Response body for an accepted confirmation event.
///
/// `message` and `outcome` are absent when the message did not carry all three fields.
#[derive(Debug, Serialize)]
pub struct ConfirmationResponse {
    pub acknowledgement: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<ConfirmationOutcome>,
}
