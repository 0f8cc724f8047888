//! Key registry - core business logic for the activation key lifecycle.
//!
//! This service handles:
//! - Bulk key generation with collision avoidance
//! - Single-use redemption
//! - Locking a redeemed key to one HWID
//! - Clearing a HWID and the administrative bulk reset
//!
//! # Atomicity Guarantees
//!
//! Every mutation runs inside one store transaction, so the check that a key is in the
//! right state and the write that moves it on cannot be interleaved with another command.

use rand::Rng;

use crate::{
    error::{AppError, KeyError},
    models::key::{KeyDumpEntry, KeyMap, KeyState, KeyStatus},
    store::{Store, Transaction},
};

/// Generate `count` new unredeemed keys of `length` digits.
///
/// # Process
///
/// 1. Validate the count and that the token space can hold the new keys
/// 2. Draw tokens at random, redrawing any that already exist
/// 3. Commit the new keys
///
/// # Errors
///
/// - `InvalidRequest`: count is zero or the token space is exhausted
/// - `Persistence`: store error
pub async fn generate_keys(
    store: &Store,
    count: usize,
    length: usize,
) -> Result<Vec<String>, AppError> {
    if count == 0 {
        return Err(AppError::InvalidRequest(
            "Please provide a valid number of keys to generate.".to_string(),
        ));
    }

    let mut tx = store.begin().await;
    let keys = tx.keys_mut()?;

    let space = u32::try_from(length)
        .ok()
        .and_then(|len| 10u128.checked_pow(len))
        .unwrap_or(u128::MAX);
    if (keys.len() + count) as u128 > space {
        return Err(AppError::InvalidRequest(format!(
            "Not enough unused {length}-digit keys left to generate {count} more."
        )));
    }

    let tokens = mint_tokens(keys, count, length);
    tx.commit().await?;

    tracing::info!(count = tokens.len(), "Generated keys");
    Ok(tokens)
}

/// Insert `count` fresh tokens into `keys`, skipping any collision.
fn mint_tokens(keys: &mut KeyMap, count: usize, length: usize) -> Vec<String> {
    let mut rng = rand::rng();
    let mut tokens = Vec::with_capacity(count);

    while tokens.len() < count {
        let token: String = (0..length)
            .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
            .collect();

        if keys.contains_key(&token) {
            tracing::debug!("Regenerating colliding key");
            continue;
        }

        keys.insert(token.clone(), KeyState::Unredeemed);
        tokens.push(token);
    }

    tokens
}

/// Redeem `token` for `principal`.
///
/// # Process
///
/// 1. Lock the store
/// 2. Move the key from unredeemed to pending HWID
/// 3. Point the principal's binding at the token (replacing any earlier one)
/// 4. Append the token to the used-key log
/// 5. Commit all three sets together
///
/// # Errors
///
/// - `NotFound`: token was never generated
/// - `AlreadyRedeemed`: token was redeemed before, by anyone
/// - `Persistence`: store error (nothing is written)
pub async fn redeem_key(store: &Store, token: &str, principal: &str) -> Result<(), AppError> {
    let mut tx = store.begin().await;

    let record = tx
        .keys_mut()?
        .get_mut(token)
        .ok_or_else(|| KeyError::NotFound(token.to_string()))?;

    if !record.redeem(principal) {
        return Err(KeyError::AlreadyRedeemed(token.to_string()).into());
    }

    tx.users_mut()?
        .insert(principal.to_string(), token.to_string());
    tx.used_keys_mut()?.push(token.to_string());
    tx.commit().await?;

    tracing::info!(token, principal, "Key redeemed");
    Ok(())
}

/// Lock a redeemed key to `hwid`.
///
/// Only a key waiting for its HWID can be bound; a bound key keeps its HWID until the
/// purchaser resets it.
///
/// # Errors
///
/// - `NotFound`: token was never generated
/// - `AlreadyBound`: key is unredeemed or already has a HWID
/// - `Persistence`: store error
pub async fn bind_hwid(store: &Store, token: &str, hwid: &str) -> Result<(), AppError> {
    let mut tx = store.begin().await;

    let record = tx
        .keys_mut()?
        .get_mut(token)
        .ok_or_else(|| KeyError::NotFound(token.to_string()))?;

    if !record.bind(hwid) {
        return Err(KeyError::AlreadyBound(token.to_string()).into());
    }

    tx.commit().await?;

    tracing::info!(token, hwid, "HWID bound");
    Ok(())
}

/// Clear the HWID of the key currently bound to `principal`, inside `tx`.
///
/// The key goes back to waiting for a HWID and keeps its redeemer. Returns the token.
/// Callers gate this behind the reset cooldown; see `cooldown_service::reset_hwid`.
///
/// # Errors
///
/// - `NoBinding`: the principal never redeemed a key
/// - `Persistence`: store error
pub fn reset_hwid(tx: &mut Transaction<'_>, principal: &str) -> Result<String, AppError> {
    let token = tx
        .users()?
        .get(principal)
        .cloned()
        .ok_or(KeyError::NoBinding)?;

    if let Some(record) = tx.keys_mut()?.get_mut(&token) {
        record.unbind();
    }

    Ok(token)
}

/// Return every key to unredeemed, dropping redeemers and HWIDs.
///
/// User bindings and cooldowns are left as they are, so a principal's binding may point
/// at a key that is unredeemed again.
pub async fn reset_all_keys(store: &Store) -> Result<usize, AppError> {
    let mut tx = store.begin().await;

    let keys = tx.keys_mut()?;
    for record in keys.values_mut() {
        *record = KeyState::Unredeemed;
    }
    let count = keys.len();

    tx.commit().await?;

    tracing::warn!(count, "All keys reset");
    Ok(count)
}

/// Binding status of `principal`.
pub async fn query_status(store: &Store, principal: &str) -> Result<KeyStatus, AppError> {
    let snapshot = store.read().await;

    let Some(token) = snapshot.users()?.remove(principal) else {
        return Ok(KeyStatus::NotRedeemed);
    };

    let status = match snapshot.keys()?.remove(&token) {
        Some(KeyState::RedeemedBound { hwid, .. }) => KeyStatus::Bound { token, hwid },
        _ => KeyStatus::NoHwid { token },
    };

    Ok(status)
}

/// Every key with its state, ordered by token.
pub async fn dump_keys(store: &Store) -> Result<Vec<KeyDumpEntry>, AppError> {
    let keys = store.read().await.keys()?;

    Ok(keys
        .into_iter()
        .map(|(token, state)| KeyDumpEntry { token, state })
        .collect())
}
