//! Data models for the persisted record sets and the command API.
//!
//! This module contains the record types stored by the store and the request/response
//! bodies exchanged with the chat gateway.

use serde::Serialize;

/// Confirmation event and outcome models
pub mod confirmation;
/// HWID reset cooldown model
pub mod cooldown;
/// Activation key model
pub mod key;

/// Plain status reply for commands that only report success or failure.
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub message: String,
}

impl CommandResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
