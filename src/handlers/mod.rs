//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives the forwarded command (JSON body, path params, auth context)
//! 2. Calls into the services
//! 3. Returns the status text for the gateway to post back

/// Confirmation bot events
pub mod confirmations;
/// Cooldown administration
pub mod cooldowns;
/// Service health
pub mod health;
/// HWID status and reset commands
pub mod hwid;
/// Key commands
pub mod keys;
