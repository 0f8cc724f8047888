//! Business logic services.
//!
//! Services contain the key lifecycle state machine separated from HTTP handlers.
//! They own store transactions, validation, and the cooldown gate.

pub mod confirmation_service;
pub mod cooldown_service;
pub mod key_service;
