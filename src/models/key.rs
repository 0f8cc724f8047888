//! Key record model and key-related API request/response types.
//!
//! This module defines:
//! - `KeyState`: the persisted lifecycle state of one activation key
//! - `KeyStatus`: what a purchaser sees when asking for their HWID
//! - Request and response bodies for the key commands

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// All keys, indexed by token. Ordered so dumps are stable.
pub type KeyMap = BTreeMap<String, KeyState>;

/// Principal id -> most recently redeemed token.
pub type UserBindings = BTreeMap<String, String>;

/// Every token that has ever been redeemed, in redemption order.
pub type UsedKeyLog = Vec<String>;

/// Lifecycle state of an activation key.
///
/// A HWID only exists on a bound key and a redeemer only exists once a key has been
/// redeemed, so neither can be set on a state that does not carry it.
///
/// # Persisted Format
///
/// ```json
/// {
///   "48213370915": { "state": "unredeemed" },
///   "90177254410": { "state": "redeemed_pending_hwid", "redeemed_by": "1272" },
///   "11820034567": { "state": "redeemed_bound", "redeemed_by": "1273", "hwid": "A1-B2" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum KeyState {
    /// Generated and waiting for a purchaser.
    Unredeemed,

    /// Redeemed by a purchaser, waiting for the confirmation that carries the HWID.
    RedeemedPendingHwid { redeemed_by: String },

    /// Locked to one hardware id until the purchaser resets it.
    RedeemedBound { redeemed_by: String, hwid: String },
}

impl KeyState {
    pub fn redeemed_by(&self) -> Option<&str> {
        match self {
            KeyState::Unredeemed => None,
            KeyState::RedeemedPendingHwid { redeemed_by }
            | KeyState::RedeemedBound { redeemed_by, .. } => Some(redeemed_by),
        }
    }

    pub fn hwid(&self) -> Option<&str> {
        match self {
            KeyState::RedeemedBound { hwid, .. } => Some(hwid),
            _ => None,
        }
    }

    /// Moves an unredeemed key to `RedeemedPendingHwid`.
    ///
    /// Returns `false` and leaves the key untouched if it was already redeemed.
    pub fn redeem(&mut self, principal: &str) -> bool {
        match self {
            KeyState::Unredeemed => {
                *self = KeyState::RedeemedPendingHwid {
                    redeemed_by: principal.to_string(),
                };
                true
            }
            _ => false,
        }
    }

    /// Locks a pending key to `hwid`.
    ///
    /// Returns `false` for unredeemed keys and for keys that already carry a HWID.
    pub fn bind(&mut self, hwid: &str) -> bool {
        match self {
            KeyState::RedeemedPendingHwid { redeemed_by } => {
                *self = KeyState::RedeemedBound {
                    redeemed_by: std::mem::take(redeemed_by),
                    hwid: hwid.to_string(),
                };
                true
            }
            _ => false,
        }
    }

    /// Drops the HWID of a bound key, keeping its redeemer.
    pub fn unbind(&mut self) {
        if let KeyState::RedeemedBound { redeemed_by, .. } = self {
            *self = KeyState::RedeemedPendingHwid {
                redeemed_by: std::mem::take(redeemed_by),
            };
        }
    }
}

impl fmt::Display for KeyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyState::Unredeemed => write!(f, "Key not redeemed yet"),
            KeyState::RedeemedPendingHwid { redeemed_by } => {
                write!(f, "redeemed by {redeemed_by}, HWID pending")
            }
            KeyState::RedeemedBound { redeemed_by, hwid } => {
                write!(f, "redeemed by {redeemed_by}, HWID {hwid}")
            }
        }
    }
}

/// Binding status of a principal, as reported by the `hwid` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum KeyStatus {
    /// The principal never redeemed a key.
    NotRedeemed,

    /// A key is bound to the principal but no HWID is locked to it.
    NoHwid { token: String },

    /// The principal's key is locked to `hwid`.
    Bound { token: String, hwid: String },
}

impl KeyStatus {
    /// Human-readable status line.
    pub fn message(&self) -> String {
        match self {
            KeyStatus::NotRedeemed => "You have not redeemed any keys.".to_string(),
            KeyStatus::NoHwid { .. } => {
                "No HWID has been set for your redeemed key yet.".to_string()
            }
            KeyStatus::Bound { token, hwid } => {
                format!("Your HWID associated with the key {token} is: {hwid}")
            }
        }
    }
}

/// Request body for `POST /api/v1/keys/redeem`.
///
/// # JSON Example
///
/// ```json
/// { "token": "48213370915" }
/// ```
#[derive(Debug, Deserialize)]
pub struct RedeemRequest {
    pub token: String,
}

/// Request body for `POST /api/v1/keys/generate`.
#[derive(Debug, Deserialize)]
pub struct GenerateKeysRequest {
    pub count: i64,
}

/// Freshly generated keys, to be delivered privately to `deliver_to`.
#[derive(Debug, Serialize)]
pub struct GenerateKeysResponse {
    pub message: String,
    pub deliver_to: String,
    pub keys: Vec<String>,
}

/// One line of a key dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyDumpEntry {
    pub token: String,
    #[serde(flatten)]
    pub state: KeyState,
}

/// Full key dump, to be delivered privately to `deliver_to`.
///
/// `message` carries the same content as `keys` rendered one key per line.
#[derive(Debug, Serialize)]
pub struct DumpKeysResponse {
    pub message: String,
    pub deliver_to: String,
    pub keys: Vec<KeyDumpEntry>,
}

/// Response body for `GET /api/v1/hwid`.
#[derive(Debug, Serialize)]
pub struct HwidStatusResponse {
    pub message: String,
    #[serde(flatten)]
    pub status: KeyStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redeem_only_from_unredeemed() {
        let mut key = KeyState::Unredeemed;
        assert!(key.redeem("alice"));
        assert_eq!(
            key,
            KeyState::RedeemedPendingHwid {
                redeemed_by: "alice".to_string()
            }
        );

        assert!(!key.redeem("bob"));
        assert_eq!(key.redeemed_by(), Some("alice"));
    }

    #[test]
    fn bind_requires_pending_state() {
        let mut key = KeyState::Unredeemed;
        assert!(!key.bind("HW1"));
        assert_eq!(key, KeyState::Unredeemed);

        key.redeem("alice");
        assert!(key.bind("HW1"));
        assert_eq!(key.hwid(), Some("HW1"));

        assert!(!key.bind("HW2"));
        assert_eq!(key.hwid(), Some("HW1"));
    }

    #[test]
    fn unbind_keeps_redeemer() {
        let mut key = KeyState::RedeemedBound {
            redeemed_by: "alice".to_string(),
            hwid: "HW1".to_string(),
        };
        key.unbind();
        assert_eq!(
            key,
            KeyState::RedeemedPendingHwid {
                redeemed_by: "alice".to_string()
            }
        );

        let mut fresh = KeyState::Unredeemed;
        fresh.unbind();
        assert_eq!(fresh, KeyState::Unredeemed);
    }

    #[test]
    fn persisted_form_is_tagged() {
        let key = KeyState::RedeemedBound {
            redeemed_by: "alice".to_string(),
            hwid: "HW1".to_string(),
        };
        let json = serde_json::to_value(&key).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"state": "redeemed_bound", "redeemed_by": "alice", "hwid": "HW1"})
        );

        assert!(serde_json::from_str::<KeyState>(r#"{"state": "redeemed_bound"}"#).is_err());
    }
}
