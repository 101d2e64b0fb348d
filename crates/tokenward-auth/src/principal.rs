// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Principal, credential and token pair types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable numeric identifier of an account.
pub type SubjectId = i64;

/// The authenticated subject of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Stable numeric identifier.
    pub id: SubjectId,
    /// Single role label, e.g. `USER` or `ADMIN`.
    pub role: String,
    /// Whether the account may currently authenticate.
    pub enabled: bool,
}

impl Principal {
    /// Creates an enabled principal.
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
}

/// Raw login credentials as submitted by the caller.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    /// Login identifier.
    pub username: String,
    /// Plain secret.
    pub password: String,
}

impl Credentials {
    /// Creates a new credentials value.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Access and refresh token minted together.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived access token.
    pub access_token: String,
    /// Longer-lived refresh token.
    pub refresh_token: String,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = Credentials::new("alice", "hunter2");
        assert!(!format!("{:?}", creds).contains("hunter2"));

        let pair = TokenPair {
            access_token: "aaa.bbb.ccc".to_string(),
            refresh_token: "ddd.eee.fff".to_string(),
        };
        assert!(!format!("{:?}", pair).contains("aaa.bbb.ccc"));
    }

    #[test]
    fn test_principal_builder() {
        let principal = Principal::new(7, "ADMIN").with_enabled(false);
        assert_eq!(principal.id, 7);
        assert_eq!(principal.role, "ADMIN");
        assert!(!principal.enabled);
    }
}
