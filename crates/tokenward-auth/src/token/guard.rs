// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Single-use enforcement for refresh tokens.
//!
//! Each used refresh token id is remembered until the token itself would
//! have expired; a second presentation within that window is rejected.

use std::time::{Duration, Instant};

use moka::future::Cache;
use moka::policy::EvictionPolicy;

use crate::error::{AuthError, AuthResult};

/// Per-entry expiry that keeps an id for the token's remaining lifetime.
struct RemainingLifetime;

impl moka::Expiry<String, Duration> for RemainingLifetime {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Duration,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(*value)
    }
}

/// Remembers refresh token ids that have already been exchanged.
pub struct RefreshGuard {
    used: Cache<String, Duration>,
}

impl RefreshGuard {
    /// Creates a guard tracking at most `max_capacity` ids.
    pub fn new(max_capacity: u64) -> Self {
        let used = Cache::builder()
            .max_capacity(max_capacity)
            .eviction_policy(EvictionPolicy::lru())
            .expire_after(RemainingLifetime)
            .build();
        Self { used }
    }

    /// Marks `jti` as used, failing if it already was.
    pub async fn mark_used(&self, jti: &str, remaining: Duration) -> AuthResult<()> {
        let entry = self
            .used
            .entry(jti.to_owned())
            .or_insert(remaining)
            .await;

        if entry.is_fresh() {
            Ok(())
        } else {
            Err(AuthError::token_invalid("refresh token already used"))
        }
    }

    /// Number of ids currently remembered (approximate).
    pub fn tracked(&self) -> u64 {
        self.used.entry_count()
    }
}

impl std::fmt::Debug for RefreshGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshGuard")
            .field("tracked", &self.used.entry_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_second_use_rejected() {
        let guard = RefreshGuard::new(100);
        guard.mark_used("jti-1", Duration::from_secs(60)).await.unwrap();

        let result = guard.mark_used("jti-1", Duration::from_secs(60)).await;
        assert!(matches!(result, Err(AuthError::TokenInvalid { .. })));
    }

    #[tokio::test]
    async fn test_distinct_ids_accepted() {
        let guard = RefreshGuard::new(100);
        guard.mark_used("jti-a", Duration::from_secs(60)).await.unwrap();
        assert!(guard.mark_used("jti-b", Duration::from_secs(60)).await.is_ok());
    }

    #[tokio::test]
    async fn test_entry_forgotten_after_lifetime() {
        let guard = RefreshGuard::new(100);
        guard.mark_used("jti-short", Duration::from_millis(50)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(120)).await;
        guard.used.run_pending_tasks().await;

        assert!(guard.mark_used("jti-short", Duration::from_secs(5)).await.is_ok());
    }
}
