//! Cooldown gate for HWID resets.
//!
//! A principal may reset their HWID once per window. The gate check and the write of the
//! new reset timestamp happen inside the caller's transaction, so two concurrent resets can
//! never both pass.

use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::{
    error::AppError,
    services::key_service,
    store::{Store, Transaction},
};

/// Fixed-window rate limit on HWID resets, keyed by principal.
#[derive(Debug, Clone, Copy)]
pub struct CooldownGate {
    window: Duration,
}

impl CooldownGate {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Reject if `principal` reset within the window, otherwise record `now` as their
    /// latest reset.
    ///
    /// # Errors
    ///
    /// - `StillCooling`: carries the time left until the window elapses
    /// - `Persistence`: store error
    pub fn check_and_consume(
        &self,
        tx: &mut Transaction<'_>,
        principal: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let now_secs = now.timestamp();

        if let Some(&last_reset) = tx.cooldowns()?.get(principal) {
            let window = i64::try_from(self.window.as_secs()).unwrap_or(i64::MAX);
            // A last reset in the future (clock moved back) counts as zero elapsed.
            let elapsed = now_secs.saturating_sub(last_reset).max(0);

            if elapsed < window {
                let remaining = Duration::from_secs((window - elapsed) as u64);
                return Err(AppError::StillCooling { remaining });
            }
        }

        tx.cooldowns_mut()?
            .insert(principal.to_string(), now_secs);
        Ok(())
    }

    /// Clear the HWID bound to `principal`, if the cooldown allows it.
    ///
    /// # Process
    ///
    /// 1. Lock the store
    /// 2. Check the cooldown and record this reset
    /// 3. Clear the HWID of the principal's key
    /// 4. Commit cooldown and key together
    ///
    /// Nothing is written when either step is rejected, so a principal without a key does
    /// not start a cooldown.
    ///
    /// # Errors
    ///
    /// - `StillCooling`: reset within the window; the key is untouched
    /// - `NoBinding`: principal never redeemed a key
    /// - `Persistence`: store error
    pub async fn reset_hwid(
        &self,
        store: &Store,
        principal: &str,
        now: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let mut tx = store.begin().await;

        self.check_and_consume(&mut tx, principal, now)?;
        let token = key_service::reset_hwid(&mut tx, principal)?;
        tx.commit().await?;

        tracing::info!(principal, token = %token, "HWID reset");
        Ok(token)
    }
}

/// Remove the cooldown of `principal`. Returns whether one existed.
pub async fn admin_clear(store: &Store, principal: &str) -> Result<bool, AppError> {
    let mut tx = store.begin().await;

    let existed = tx.cooldowns()?.contains_key(principal);
    if existed {
        tx.cooldowns_mut()?.remove(principal);
        tx.commit().await?;
        tracing::info!(principal, "Cooldown cleared by administrator");
    }

    Ok(existed)
}
