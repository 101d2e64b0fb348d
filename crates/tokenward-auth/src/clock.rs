// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Time source for issuance and expiry checks.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use chrono::Utc;

/// Source of the current Unix time.
pub trait Clock: Send + Sync {
    /// Returns the current Unix timestamp in milliseconds.
    fn now_millis(&self) -> i64;

    /// Returns the current Unix timestamp in seconds, rounded down.
    fn now(&self) -> i64 {
        self.now_millis().div_euclid(1_000)
    }

    /// Returns the issuance timestamp in seconds, rounded up.
    ///
    /// A token stamped `iat = issued_at()`, `exp = iat + lifetime` and
    /// checked against [`Clock::now`] stays valid for at least `lifetime`.
    fn issued_at(&self) -> i64 {
        (self.now_millis() + 999).div_euclid(1_000)
    }
}

/// Wall clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Manually driven clock.
///
/// Starts at a fixed timestamp and only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now_millis: AtomicI64,
}

impl ManualClock {
    /// Creates a clock frozen at `now` seconds.
    pub fn new(now: i64) -> Self {
        Self::from_millis(now * 1_000)
    }

    /// Creates a clock frozen at `now_millis` milliseconds.
    pub fn from_millis(now_millis: i64) -> Self {
        Self {
            now_millis: AtomicI64::new(now_millis),
        }
    }

    /// Creates a clock frozen at the current system time.
    pub fn starting_now() -> Self {
        Self::from_millis(Utc::now().timestamp_millis())
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        self.now_millis
            .fetch_add(by.as_millis() as i64, Ordering::SeqCst);
    }

    /// Jumps to an absolute timestamp in seconds.
    pub fn set(&self, now: i64) {
        self.now_millis.store(now * 1_000, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now_millis.load(Ordering::SeqCst)
    }
}
