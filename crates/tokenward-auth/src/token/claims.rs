// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Token claims structures.
//!
//! Claims are kept apart from [`Principal`]: they are the wire shape of a
//! token, while a principal is what the rest of the service works with.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};
use crate::principal::{Principal, SubjectId};

/// Which half of a token pair a token is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived request credential.
    Access,
    /// Long-lived credential exchangeable for a new pair.
    Refresh,
}

/// Claims that carry a subject and a validity window.
pub trait TimedClaims {
    /// Returns the token kind.
    fn kind(&self) -> TokenKind;

    /// Returns the raw `sub` claim.
    fn subject(&self) -> &str;

    /// Returns the issued-at timestamp.
    fn issued_at(&self) -> i64;

    /// Returns the expiration timestamp.
    fn expires_at(&self) -> i64;

    /// Parses the subject as a numeric id.
    fn subject_id(&self) -> AuthResult<SubjectId> {
        parse_subject(self.subject())
    }

    /// Returns `true` if the token is expired at `now`.
    fn is_expired_at(&self, now: i64) -> bool {
        now >= self.expires_at()
    }

    /// Returns the validity left at `now`, zero once expired.
    fn remaining_at(&self, now: i64) -> Duration {
        Duration::from_secs(self.expires_at().saturating_sub(now).max(0) as u64)
    }
}

// =============================================================================
// Access Claims
// =============================================================================

/// Claims embedded in an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject id, as a decimal string.
    pub sub: String,
    /// Role at issuance.
    pub role: String,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// Issuer.
    pub iss: String,
    /// Token id.
    pub jti: String,
    /// Token kind, always `access`.
    pub typ: TokenKind,
}

impl AccessClaims {
    /// Creates access claims for `principal`.
    pub fn new(principal: &Principal, issuer: &str, issued_at: i64, lifetime_secs: i64) -> Self {
        Self {
            sub: principal.id.to_string(),
            role: principal.role.clone(),
            iat: issued_at,
            exp: issued_at + lifetime_secs,
            iss: issuer.to_string(),
            jti: Uuid::now_v7().to_string(),
            typ: TokenKind::Access,
        }
    }

    /// Rebuilds the principal carried by these claims.
    pub fn to_principal(&self) -> AuthResult<Principal> {
        Ok(Principal::new(self.subject_id()?, self.role.clone()))
    }
}

impl TimedClaims for AccessClaims {
    fn kind(&self) -> TokenKind {
        self.typ
    }

    fn subject(&self) -> &str {
        &self.sub
    }

    fn issued_at(&self) -> i64 {
        self.iat
    }

    fn expires_at(&self) -> i64 {
        self.exp
    }
}

// =============================================================================
// Refresh Claims
// =============================================================================

/// Claims embedded in a refresh token. No role: it is re-read on refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Subject id, as a decimal string.
    pub sub: String,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// Issuer.
    pub iss: String,
    /// Token id.
    pub jti: String,
    /// Token kind, always `refresh`.
    pub typ: TokenKind,
}

impl RefreshClaims {
    /// Creates refresh claims for `subject_id`.
    pub fn new(subject_id: SubjectId, issuer: &str, issued_at: i64, lifetime_secs: i64) -> Self {
        Self {
            sub: subject_id.to_string(),
            iat: issued_at,
            exp: issued_at + lifetime_secs,
            iss: issuer.to_string(),
            jti: Uuid::now_v7().to_string(),
            typ: TokenKind::Refresh,
        }
    }
}

impl TimedClaims for RefreshClaims {
    fn kind(&self) -> TokenKind {
        self.typ
    }

    fn subject(&self) -> &str {
        &self.sub
    }

    fn issued_at(&self) -> i64 {
        self.iat
    }

    fn expires_at(&self) -> i64 {
        self.exp
    }
}

// =============================================================================
// Subject Claims
// =============================================================================

/// Minimal view of any token: just the subject.
#[derive(Debug, Clone, Deserialize)]
pub struct SubjectClaims {
    /// Subject id, as a decimal string.
    pub sub: String,
}

impl SubjectClaims {
    /// Parses the subject as a numeric id.
    pub fn subject_id(&self) -> AuthResult<SubjectId> {
        parse_subject(&self.sub)
    }
}

fn parse_subject(sub: &str) -> AuthResult<SubjectId> {
    sub.parse()
        .map_err(|_| AuthError::token_invalid("subject is not a numeric id"))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_claims_window() {
        let principal = Principal::new(42, "USER");
        let claims = AccessClaims::new(&principal, "tokenward", 1_000, 900);

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.role, "USER");
        assert_eq!(claims.exp - claims.iat, 900);
        assert_eq!(claims.kind(), TokenKind::Access);
        assert_eq!(claims.to_principal().unwrap(), principal);
    }

    #[test]
    fn test_refresh_claims_have_no_role() {
        let claims = RefreshClaims::new(42, "tokenward", 1_000, 3_600);
        let json = serde_json::to_value(&claims).unwrap();

        assert!(json.get("role").is_none());
        assert_eq!(json["typ"], "refresh");
    }

    #[test]
    fn test_expiry_boundary() {
        let claims = RefreshClaims::new(1, "tokenward", 1_000, 60);

        assert!(!claims.is_expired_at(1_059));
        assert!(claims.is_expired_at(1_060));
        assert!(claims.is_expired_at(2_000));
        assert_eq!(claims.remaining_at(1_030), Duration::from_secs(30));
        assert_eq!(claims.remaining_at(5_000), Duration::ZERO);
    }

    #[test]
    fn test_non_numeric_subject_rejected() {
        let claims = SubjectClaims {
            sub: "alice".to_string(),
        };
        assert!(matches!(
            claims.subject_id(),
            Err(AuthError::TokenInvalid { .. })
        ));
    }

    #[test]
    fn test_token_ids_are_unique() {
        let principal = Principal::new(1, "USER");
        let a = AccessClaims::new(&principal, "tokenward", 0, 60);
        let b = AccessClaims::new(&principal, "tokenward", 0, 60);
        assert_ne!(a.jti, b.jti);
    }
}
