//! Failed-login bookkeeping and temporary lockout.
//!
//! State lives in the key-value store under `failedAttemptCount` and
//! `lockoutExpiryEpochMillis`. Missing or unreadable values are treated as the
//! initial unlocked state, and store failures never block a login attempt.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::{keys, KeyValueStore};

/// Threshold and duration of a lockout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    /// Consecutive failures that trigger a lock
    pub max_attempts: u32,
    /// How long a lock lasts
    pub duration: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            duration: Duration::from_secs(300),
        }
    }
}

impl LockoutPolicy {
    /// Lock length in milliseconds, saturating at `i64::MAX`.
    pub fn duration_ms(&self) -> i64 {
        i64::try_from(self.duration.as_millis()).unwrap_or(i64::MAX)
    }
}

/// Result of asking whether an attempt may proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockoutStatus {
    pub locked: bool,
    pub seconds_remaining: u64,
}

impl LockoutStatus {
    pub const UNLOCKED: LockoutStatus = LockoutStatus {
        locked: false,
        seconds_remaining: 0,
    };
}

/// Result of recording a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureOutcome {
    pub locked: bool,
    pub attempts_remaining: u32,
}

/// Decoded lockout bookkeeping.
///
/// `lockout_expires_at` is only ever set by the failure that reaches the threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LockoutState {
    pub failed_attempts: u32,
    /// Epoch milliseconds
    pub lockout_expires_at: Option<i64>,
}

impl LockoutState {
    /// Build state from raw stored strings. Anything unparsable becomes its default.
    pub fn decode(failed_attempts: Option<&str>, lockout_expires_at: Option<&str>) -> Self {
        Self {
            failed_attempts: failed_attempts
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(0),
            lockout_expires_at: lockout_expires_at.and_then(|v| v.trim().parse().ok()),
        }
    }

    /// Report the lock at `now_ms`. An expired lock is cleared together with the
    /// failure counter; returns whether the state changed.
    pub fn check(&mut self, now_ms: i64) -> (LockoutStatus, bool) {
        match self.lockout_expires_at {
            None => (LockoutStatus::UNLOCKED, false),
            Some(expiry) if expiry > now_ms => {
                let remaining_ms = expiry.saturating_sub(now_ms) as u64;
                let status = LockoutStatus {
                    locked: true,
                    seconds_remaining: remaining_ms.div_ceil(1000),
                };
                (status, false)
            }
            Some(_) => {
                *self = Self::default();
                (LockoutStatus::UNLOCKED, true)
            }
        }
    }

    /// Count a failure at `now_ms`, engaging the lock once the threshold is reached.
    pub fn record_failure(&mut self, now_ms: i64, policy: &LockoutPolicy) -> FailureOutcome {
        self.failed_attempts = self.failed_attempts.saturating_add(1);

        if self.failed_attempts >= policy.max_attempts {
            self.lockout_expires_at = Some(now_ms.saturating_add(policy.duration_ms()));
            FailureOutcome {
                locked: true,
                attempts_remaining: 0,
            }
        } else {
            FailureOutcome {
                locked: false,
                attempts_remaining: policy.max_attempts - self.failed_attempts,
            }
        }
    }
}

/// Applies [`LockoutState`] transitions against a key-value store.
pub struct LockoutGuard<S> {
    store: Arc<S>,
    policy: LockoutPolicy,
}

impl<S> Clone for LockoutGuard<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            policy: self.policy,
        }
    }
}

impl<S: KeyValueStore> LockoutGuard<S> {
    pub fn new(store: Arc<S>, policy: LockoutPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &LockoutPolicy {
        &self.policy
    }

    /// Whether a credential check may proceed right now.
    pub async fn check_lockout(&self) -> LockoutStatus {
        self.check_lockout_at(Utc::now()).await
    }

    pub async fn check_lockout_at(&self, now: DateTime<Utc>) -> LockoutStatus {
        let mut state = self.load().await;
        let (status, changed) = state.check(now.timestamp_millis());
        if changed {
            tracing::info!("Login lockout expired, failure counter reset");
            self.clear().await;
        }
        status
    }

    /// Count a failed credential check.
    pub async fn record_failure(&self) -> FailureOutcome {
        self.record_failure_at(Utc::now()).await
    }

    pub async fn record_failure_at(&self, now: DateTime<Utc>) -> FailureOutcome {
        let mut state = self.load().await;
        let outcome = state.record_failure(now.timestamp_millis(), &self.policy);

        self.write(keys::FAILED_ATTEMPT_COUNT, &state.failed_attempts.to_string())
            .await;
        if let Some(expiry) = state.lockout_expires_at.filter(|_| outcome.locked) {
            self.write(keys::LOCKOUT_EXPIRY, &expiry.to_string()).await;
            tracing::info!(
                "Login locked after {} failed attempts for {}s",
                state.failed_attempts,
                self.policy.duration.as_secs()
            );
        } else {
            tracing::debug!(
                "Failed login attempt, {} remaining",
                outcome.attempts_remaining
            );
        }

        outcome
    }

    /// Reset the counter and lift any lock.
    pub async fn record_success(&self) {
        self.clear().await;
    }

    /// Current stored failure count, 0 when absent or unreadable.
    pub async fn failed_attempts(&self) -> u32 {
        self.load().await.failed_attempts
    }

    async fn load(&self) -> LockoutState {
        let count = self.read(keys::FAILED_ATTEMPT_COUNT).await;
        let expiry = self.read(keys::LOCKOUT_EXPIRY).await;
        LockoutState::decode(count.as_deref(), expiry.as_deref())
    }

    async fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Reading {} failed, treating as absent: {}", key, e);
                None
            }
        }
    }

    async fn write(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value).await {
            tracing::warn!("Writing {} failed: {}", key, e);
        }
    }

    async fn clear(&self) {
        for key in [keys::FAILED_ATTEMPT_COUNT, keys::LOCKOUT_EXPIRY] {
            if let Err(e) = self.store.remove(key).await {
                tracing::warn!("Removing {} failed: {}", key, e);
            }
        }
    }
}
