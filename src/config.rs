//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use serde::Deserialize;
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `GATEWAY_TOKEN` (required): shared secret the chat gateway presents as a Bearer token
/// - `PURCHASER_ROLE_ID` (required): role id granting the purchaser commands
/// - `ADMIN_ROLE_ID` (required): role id granting the administrator commands
/// - `CONFIRMATION_AUTHOR_ID` (required): the only identity whose messages can bind a HWID
/// - `CONFIRMATION_SECRET` (optional): enables HMAC verification of confirmation events
/// - `DATA_DIR` (optional): directory holding the JSON record sets, defaults to `data`
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `COOLDOWN_SECS` (optional): HWID reset cooldown window, defaults to one day
/// - `KEY_LENGTH` (optional): digits per generated key, defaults to 11
/// - `MAX_GENERATE` (optional): upper bound for a single generate command, defaults to 100
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub gateway_token: String,

    pub purchaser_role_id: String,

    pub admin_role_id: String,

    pub confirmation_author_id: String,

    #[serde(default)]
    pub confirmation_secret: Option<String>,

    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,

    #[serde(default = "default_key_length")]
    pub key_length: usize,

    #[serde(default = "default_max_generate")]
    pub max_generate: usize,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

/// 24 hours.
fn default_cooldown_secs() -> u64 {
    86_400
}

fn default_key_length() -> usize {
    11
}

fn default_max_generate() -> usize {
    100
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (e.g., GATEWAY_TOKEN)
    /// - Environment variable values cannot be parsed into expected types
    pub fn from_env() -> Result<Self, envy::Error> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        // Field names are automatically converted: gateway_token -> GATEWAY_TOKEN
        envy::from_env::<Config>()
    }
}
