// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Mock Implementations
//!
//! Scriptable stand-ins for the credential directory and the
//! authentication manager. Both record how often they were called and can
//! be told to fail or stall.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use tokenward_auth::{
    AuthError, AuthResult, AuthenticationManager, CredentialDirectory, Credentials,
    DirectoryEntry, DirectoryError, Principal, SubjectId,
};

// =============================================================================
// Mock Directory
// =============================================================================

/// A credential directory with configurable failure modes.
#[derive(Debug, Default)]
pub struct MockDirectory {
    /// Entries keyed by subject id.
    entries: Mutex<HashMap<SubjectId, DirectoryEntry>>,

    /// Report every lookup as unavailable.
    unavailable: AtomicBool,

    /// Report every lookup as a backend failure.
    broken: AtomicBool,

    /// Simulated lookup latency in milliseconds.
    delay_ms: AtomicU64,

    /// Lookup count for verification.
    lookups: AtomicU64,
}

impl MockDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory holding one enabled entry.
    pub fn with_entry(id: SubjectId, role: &str) -> Self {
        let directory = Self::new();
        directory.put(DirectoryEntry::new(id, role));
        directory
    }

    /// Inserts or replaces an entry.
    pub fn put(&self, entry: DirectoryEntry) {
        self.entries
            .lock()
            .expect("directory lock poisoned")
            .insert(entry.id, entry);
    }

    /// Changes the role of an existing entry.
    pub fn set_role(&self, id: SubjectId, role: &str) {
        if let Some(entry) = self.entries.lock().expect("directory lock poisoned").get_mut(&id) {
            entry.role = role.to_string();
        }
    }

    /// Enables or disables an existing entry.
    pub fn set_enabled(&self, id: SubjectId, enabled: bool) {
        if let Some(entry) = self.entries.lock().expect("directory lock poisoned").get_mut(&id) {
            entry.enabled = enabled;
        }
    }

    /// Removes an entry.
    pub fn remove(&self, id: SubjectId) {
        self.entries.lock().expect("directory lock poisoned").remove(&id);
    }

    /// Makes lookups report the directory as unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Makes lookups report a backend failure.
    pub fn set_broken(&self, broken: bool) {
        self.broken.store(broken, Ordering::SeqCst);
    }

    /// Sets the simulated lookup latency.
    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Number of lookups so far.
    pub fn lookup_count(&self) -> u64 {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialDirectory for MockDirectory {
    async fn find(&self, id: SubjectId) -> Result<Option<DirectoryEntry>, DirectoryError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DirectoryError::Unavailable("mock directory offline".to_string()));
        }
        if self.broken.load(Ordering::SeqCst) {
            return Err(DirectoryError::Backend("mock directory exploded".to_string()));
        }

        Ok(self
            .entries
            .lock()
            .expect("directory lock poisoned")
            .get(&id)
            .cloned())
    }
}

// =============================================================================
// Mock Authenticator
// =============================================================================

/// An authentication manager that accepts a fixed set of credentials
/// without hashing.
#[derive(Debug, Default)]
pub struct MockAuthenticator {
    users: Mutex<HashMap<String, (String, Principal)>>,
    fail_all: AtomicBool,
    attempts: AtomicU64,
}

impl MockAuthenticator {
    /// Creates an authenticator with no users.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user.
    pub fn with_user(self, username: &str, password: &str, principal: Principal) -> Self {
        self.users
            .lock()
            .expect("authenticator lock poisoned")
            .insert(username.to_string(), (password.to_string(), principal));
        self
    }

    /// Makes every attempt fail with an internal error.
    pub fn set_fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    /// Number of authentication attempts so far.
    pub fn attempt_count(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthenticationManager for MockAuthenticator {
    async fn authenticate(&self, credentials: &Credentials) -> AuthResult<Principal> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if self.fail_all.load(Ordering::SeqCst) {
            return Err(AuthError::internal("mock authenticator failure"));
        }

        let users = self.users.lock().expect("authenticator lock poisoned");
        match users.get(&credentials.username) {
            Some((password, principal)) if *password == credentials.password => {
                Ok(principal.clone())
            }
            _ => Err(AuthError::InvalidCredentials),
        }
    }
}
