//! Shared application state injected into every handler.

use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;

use crate::{
    config::Config,
    roles::{ConfiguredRoles, RolePredicate},
    services::cooldown_service::CooldownGate,
    store::Store,
};

/// Everything a handler needs, cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,

    pub roles: Arc<dyn RolePredicate>,

    pub cooldown: CooldownGate,

    /// Hex SHA-256 of the gateway token. The plain token is not kept.
    pub gateway_token_hash: String,

    /// Only confirmation events from this author are acted on.
    pub confirmation_author_id: String,

    /// When set, confirmation events must carry a matching HMAC signature.
    pub confirmation_secret: Option<String>,

    pub key_length: usize,

    pub max_generate: usize,
}

impl AppState {
    pub fn from_config(config: &Config, store: Store) -> Self {
        Self {
            store,
            roles: Arc::new(ConfiguredRoles {
                purchaser_role_id: config.purchaser_role_id.clone(),
                admin_role_id: config.admin_role_id.clone(),
            }),
            cooldown: CooldownGate::new(Duration::from_secs(config.cooldown_secs)),
            gateway_token_hash: hash_token(&config.gateway_token),
            confirmation_author_id: config.confirmation_author_id.clone(),
            confirmation_secret: config.confirmation_secret.clone(),
            key_length: config.key_length,
            max_generate: config.max_generate,
        }
    }
}

/// Hex-encoded SHA-256 of a bearer token.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
