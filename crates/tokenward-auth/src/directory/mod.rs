// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Credential directory and authentication manager abstractions.
//!
//! The token layer never owns account data. It asks a [`CredentialDirectory`]
//! for the current state of a subject during refresh, and delegates login to
//! an [`AuthenticationManager`]. [`InMemoryAccounts`] implements both.

mod memory;
mod password;

use async_trait::async_trait;
use thiserror::Error;

use crate::error::{AuthError, AuthResult};
use crate::principal::{Credentials, Principal, SubjectId};

pub use memory::{Account, InMemoryAccounts};
pub use password::{hash_password, verify_password};

// =============================================================================
// DirectoryEntry
// =============================================================================

/// Current state of an account as reported by the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Subject id.
    pub id: SubjectId,
    /// Current role.
    pub role: String,
    /// Whether the account may authenticate.
    pub enabled: bool,
}

impl DirectoryEntry {
    /// Creates an enabled entry.
    pub fn new(id: SubjectId, role: impl Into<String>) -> Self {
        Self {
            id,
            role: role.into(),
            enabled: true,
        }
    }

    /// Sets the enablement flag.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Converts to a principal.
    pub fn into_principal(self) -> Principal {
        Principal::new(self.id, self.role).with_enabled(self.enabled)
    }
}

// =============================================================================
// DirectoryError
// =============================================================================

/// Failures a directory backend can report.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The backend could not be reached or did not answer.
    #[error("directory unavailable: {0}")]
    Unavailable(String),

    /// Any other backend failure.
    #[error("directory backend error: {0}")]
    Backend(String),
}

impl From<DirectoryError> for AuthError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::Unavailable(reason) => AuthError::directory_unavailable(reason),
            DirectoryError::Backend(message) => AuthError::internal(message),
        }
    }
}

// =============================================================================
// Traits
// =============================================================================

/// Source of truth for account role and enablement.
#[async_trait]
pub trait CredentialDirectory: Send + Sync {
    /// Looks up the current state of `id`. `Ok(None)` means no such account.
    async fn find(&self, id: SubjectId) -> Result<Option<DirectoryEntry>, DirectoryError>;
}

/// Verifies login credentials.
#[async_trait]
pub trait AuthenticationManager: Send + Sync {
    /// Returns the principal for valid credentials.
    ///
    /// Unknown users, wrong passwords and disabled accounts all fail with
    /// [`AuthError::InvalidCredentials`].
    async fn authenticate(&self, credentials: &Credentials) -> AuthResult<Principal>;
}
