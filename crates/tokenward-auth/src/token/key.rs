// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Signing key holder.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};

use crate::error::{AuthError, AuthResult};

/// Recommended minimum secret length in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Length of secrets produced by [`SigningKey::generate_secret`].
const GENERATED_SECRET_LEN: usize = 64;

/// Immutable HMAC signing key shared by every token operation.
///
/// Built once at startup from the configured secret. There is no way to
/// swap the secret afterwards; tokens signed under a different secret
/// simply fail verification.
#[derive(Clone)]
pub struct SigningKey {
    algorithm: Algorithm,
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
}

impl SigningKey {
    /// Creates a key from raw secret bytes.
    pub fn from_secret(secret: &[u8], algorithm: Algorithm) -> AuthResult<Self> {
        if !is_hmac(algorithm) {
            return Err(AuthError::internal(format!(
                "Unsupported signing algorithm {:?}; only HS256, HS384 and HS512 are allowed",
                algorithm
            )));
        }
        if secret.is_empty() {
            return Err(AuthError::internal("Signing secret is not configured"));
        }
        if secret.len() < MIN_SECRET_LEN {
            tracing::warn!(
                len = secret.len(),
                "Signing secret is shorter than recommended ({} bytes)",
                MIN_SECRET_LEN
            );
        }

        Ok(Self {
            algorithm,
            encoding_key: Arc::new(EncodingKey::from_secret(secret)),
            decoding_key: Arc::new(DecodingKey::from_secret(secret)),
        })
    }

    /// Generates a random base64 secret suitable for configuration.
    pub fn generate_secret() -> AuthResult<String> {
        let mut bytes = [0u8; GENERATED_SECRET_LEN];
        getrandom::getrandom(&mut bytes)
            .map_err(|e| AuthError::internal(format!("Failed to gather entropy: {}", e)))?;
        Ok(STANDARD.encode(bytes))
    }

    /// Returns the signing algorithm.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

pub(crate) fn is_hmac(algorithm: Algorithm) -> bool {
    matches!(
        algorithm,
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
    )
}
