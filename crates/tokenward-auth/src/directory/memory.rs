// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-memory account store.

use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};

use super::password::{decoy_hash, hash_password, verify_password};
use super::{AuthenticationManager, CredentialDirectory, DirectoryEntry, DirectoryError};
use crate::error::{AuthError, AuthResult};
use crate::principal::{Credentials, Principal, SubjectId};

/// A stored account.
#[derive(Clone)]
pub struct Account {
    /// Subject id.
    pub id: SubjectId,
    /// Login name.
    pub username: String,
    /// Argon2 PHC hash.
    pub password_hash: String,
    /// Role label.
    pub role: String,
    /// Whether the account may authenticate.
    pub enabled: bool,
}

impl Account {
    /// Creates an enabled account from an existing password hash.
    pub fn new(
        id: SubjectId,
        username: impl Into<String>,
        password_hash: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            password_hash: password_hash.into(),
            role: role.into(),
            enabled: true,
        }
    }

    /// Sets the enablement flag.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    fn entry(&self) -> DirectoryEntry {
        DirectoryEntry::new(self.id, self.role.clone()).with_enabled(self.enabled)
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("role", &self.role)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

/// Thread-safe account store serving both login and refresh lookups.
///
/// Role and enablement changes take effect on the next refresh; tokens
/// already issued keep the role they were minted with.
#[derive(Debug, Default)]
pub struct InMemoryAccounts {
    by_id: DashMap<SubjectId, Account>,
    usernames: DashMap<String, SubjectId>,
}

impl InMemoryAccounts {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an account.
    ///
    /// Fails with `BadRequest` when the username belongs to another id.
    pub fn insert(&self, account: Account) -> AuthResult<()> {
        let id = account.id;
        let username = account.username.clone();

        match self.usernames.entry(username.clone()) {
            Entry::Occupied(owner) if *owner.get() != id => {
                return Err(AuthError::bad_request(format!(
                    "Username '{}' already belongs to account {}",
                    username,
                    owner.get()
                )));
            }
            Entry::Occupied(_) => {}
            Entry::Vacant(slot) => {
                slot.insert(id);
            }
        }

        if let Some(previous) = self.by_id.insert(id, account) {
            if previous.username != username {
                self.usernames.remove_if(&previous.username, |_, owner| *owner == id);
            }
        }
        Ok(())
    }

    /// Hashes `password` and inserts an enabled account.
    pub fn add_user(
        &self,
        id: SubjectId,
        username: &str,
        password: &str,
        role: &str,
    ) -> AuthResult<()> {
        let hash = hash_password(password)?;
        self.insert(Account::new(id, username, hash, role))
    }

    /// Changes the role of `id`. Returns `false` if there is no such account.
    pub fn set_role(&self, id: SubjectId, role: impl Into<String>) -> bool {
        match self.by_id.get_mut(&id) {
            Some(mut account) => {
                account.role = role.into();
                true
            }
            None => false,
        }
    }

    /// Enables or disables `id`. Returns `false` if there is no such account.
    pub fn set_enabled(&self, id: SubjectId, enabled: bool) -> bool {
        match self.by_id.get_mut(&id) {
            Some(mut account) => {
                account.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Removes `id`.
    pub fn remove(&self, id: SubjectId) -> Option<Account> {
        let (_, account) = self.by_id.remove(&id)?;
        self.usernames.remove_if(&account.username, |_, owner| *owner == id);
        Some(account)
    }

    /// Number of stored accounts.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Returns `true` if there are no accounts.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    fn by_username(&self, username: &str) -> Option<Account> {
        let id = *self.usernames.get(username)?;
        self.by_id.get(&id).map(|a| a.clone())
    }
}

#[async_trait]
impl CredentialDirectory for InMemoryAccounts {
    async fn find(&self, id: SubjectId) -> Result<Option<DirectoryEntry>, DirectoryError> {
        Ok(self.by_id.get(&id).map(|a| a.entry()))
    }
}

#[async_trait]
impl AuthenticationManager for InMemoryAccounts {
    async fn authenticate(&self, credentials: &Credentials) -> AuthResult<Principal> {
        let account = match self.by_username(&credentials.username) {
            Some(account) => account,
            None => {
                // Same Argon2 cost as a known user with a wrong password.
                verify_off_thread(decoy_hash().to_string(), credentials.password.clone()).await?;
                tracing::debug!(username = %credentials.username, "Unknown username");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let matches =
            verify_off_thread(account.password_hash.clone(), credentials.password.clone()).await?;

        if !matches {
            tracing::debug!(subject_id = account.id, "Password mismatch");
            return Err(AuthError::InvalidCredentials);
        }
        if !account.enabled {
            tracing::debug!(subject_id = account.id, "Login attempt on disabled account");
            return Err(AuthError::InvalidCredentials);
        }

        Ok(Principal::new(account.id, account.role))
    }
}

async fn verify_off_thread(hash: String, password: String) -> AuthResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&hash, &password))
        .await
        .map_err(|e| AuthError::internal(format!("Password verification aborted: {}", e)))
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;

    fn store() -> InMemoryAccounts {
        let accounts = InMemoryAccounts::new();
        accounts.add_user(42, "alice", "wonderland", "USER").unwrap();
        accounts
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let accounts = store();
        let principal = accounts
            .authenticate(&Credentials::new("alice", "wonderland"))
            .await
            .unwrap();
        assert_eq!(principal, Principal::new(42, "USER"));
    }

    #[tokio::test]
    async fn test_authenticate_failures_are_indistinguishable() {
        let accounts = store();

        let wrong_password = accounts
            .authenticate(&Credentials::new("alice", "nope"))
            .await;
        assert!(matches!(wrong_password, Err(AuthError::InvalidCredentials)));

        let unknown = accounts.authenticate(&Credentials::new("bob", "x")).await;
        assert!(matches!(unknown, Err(AuthError::InvalidCredentials)));

        accounts.set_enabled(42, false);
        let disabled = accounts
            .authenticate(&Credentials::new("alice", "wonderland"))
            .await;
        assert!(matches!(disabled, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_find_reflects_changes() {
        let accounts = store();
        assert!(accounts.set_role(42, "ADMIN"));
        assert!(accounts.set_enabled(42, false));

        let entry = accounts.find(42).await.unwrap().unwrap();
        assert_eq!(entry.role, "ADMIN");
        assert!(!entry.enabled);

        assert!(accounts.find(7).await.unwrap().is_none());
        assert!(!accounts.set_role(7, "ADMIN"));
    }

    #[test]
    fn test_rename_drops_old_username() {
        let accounts = store();
        accounts
            .insert(Account::new(42, "alicia", "hash", "USER"))
            .unwrap();

        assert!(accounts.by_username("alice").is_none());
        assert!(accounts.by_username("alicia").is_some());
        assert_eq!(accounts.len(), 1);

        accounts.remove(42);
        assert!(accounts.is_empty());
    }

    #[test]
    fn test_username_taken_by_other_id_is_rejected() {
        let accounts = store();

        let err = accounts
            .insert(Account::new(7, "alice", "hash", "USER"))
            .unwrap_err();
        assert!(matches!(err, AuthError::BadRequest { .. }));
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts.by_username("alice").unwrap().id, 42);
    }

    #[tokio::test]
    async fn test_remove_keeps_username_reused_after_rename() {
        let accounts = store();
        accounts
            .insert(Account::new(42, "alicia", "hash", "USER"))
            .unwrap();
        accounts.add_user(7, "alice", "looking-glass", "USER").unwrap();

        accounts.remove(42);

        let principal = accounts
            .authenticate(&Credentials::new("alice", "looking-glass"))
            .await
            .unwrap();
        assert_eq!(principal.id, 7);
    }

    #[tokio::test]
    async fn test_unknown_username_costs_a_hash_verification() {
        let accounts = store();
        // Warm the decoy hash.
        let _ = accounts.authenticate(&Credentials::new("nobody", "x")).await;

        let mut unknown = Duration::ZERO;
        let mut wrong_password = Duration::ZERO;
        for _ in 0..3 {
            let started = Instant::now();
            let _ = accounts.authenticate(&Credentials::new("nobody", "x")).await;
            unknown += started.elapsed();

            let started = Instant::now();
            let _ = accounts.authenticate(&Credentials::new("alice", "x")).await;
            wrong_password += started.elapsed();
        }

        assert!(
            unknown * 4 >= wrong_password,
            "unknown={:?} wrong_password={:?}",
            unknown,
            wrong_password
        );
    }
}
