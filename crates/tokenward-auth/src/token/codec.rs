// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Signed token encoding and decoding.

use std::sync::Arc;

use jsonwebtoken::{decode, encode, errors::ErrorKind, Header, Validation};
use serde::{de::DeserializeOwned, Serialize};

use super::claims::{TimedClaims, TokenKind};
use super::key::SigningKey;
use crate::clock::Clock;
use crate::error::{AuthError, AuthResult};

/// Encodes claims into signed strings and back.
///
/// Signature, algorithm, issuer and required claims are checked by
/// `jsonwebtoken`. Expiry is checked here against the injected clock with no
/// leeway, so a token is rejected from the second its `exp` is reached.
#[derive(Clone)]
pub struct TokenCodec {
    key: SigningKey,
    clock: Arc<dyn Clock>,
    validation: Arc<Validation>,
}

impl TokenCodec {
    /// Creates a codec bound to `key` and `issuer`.
    pub fn new(key: SigningKey, issuer: &str, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(key.algorithm());
        validation.set_issuer(&[issuer]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        Self {
            key,
            clock,
            validation: Arc::new(validation),
        }
    }

    /// Replaces the clock used for expiry checks.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Signs `claims`.
    pub fn encode<C: Serialize>(&self, claims: &C) -> AuthResult<String> {
        let header = Header::new(self.key.algorithm());

        encode(&header, claims, self.key.encoding_key())
            .map_err(|e| AuthError::internal(format!("Failed to create token: {}", e)))
    }

    /// Verifies and decodes a token of the expected kind.
    ///
    /// Fails with `TokenInvalid` on any structural, signature or kind
    /// problem, and with `TokenExpired` once `now >= exp`.
    pub fn decode<C>(&self, token: &str, expected: TokenKind) -> AuthResult<C>
    where
        C: DeserializeOwned + TimedClaims,
    {
        let claims: C = self.verify(token)?;

        if claims.kind() != expected {
            return Err(AuthError::token_invalid(format!(
                "token type mismatch: expected {:?}, got {:?}",
                expected,
                claims.kind()
            )));
        }
        if claims.is_expired_at(self.clock.now()) {
            return Err(AuthError::TokenExpired);
        }

        Ok(claims)
    }

    /// Verifies signature and structure but not expiry.
    pub fn decode_ignoring_expiry<C: DeserializeOwned>(&self, token: &str) -> AuthResult<C> {
        self.verify(token)
    }

    /// Returns the clock used for expiry checks.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    fn verify<C: DeserializeOwned>(&self, token: &str) -> AuthResult<C> {
        decode::<C>(token, self.key.decoding_key(), &self.validation)
            .map(|data| data.claims)
            .map_err(map_decode_error)
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

fn map_decode_error(e: jsonwebtoken::errors::Error) -> AuthError {
    match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidSignature => AuthError::token_invalid("signature mismatch"),
        ErrorKind::InvalidAlgorithm => AuthError::token_invalid("unexpected algorithm"),
        ErrorKind::InvalidIssuer => AuthError::token_invalid("unexpected issuer"),
        ErrorKind::MissingRequiredClaim(claim) => {
            AuthError::token_invalid(format!("missing claim {}", claim))
        }
        ErrorKind::InvalidToken => AuthError::token_invalid("malformed token"),
        _ => AuthError::token_invalid(format!("token decoding failed: {}", e)),
    }
}

// =============================================================================
// Tests
// =============================================================================
