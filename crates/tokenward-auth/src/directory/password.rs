// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Argon2 password hashing in PHC string format.

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use once_cell::sync::OnceCell;
use password_hash::{PasswordHash, SaltString};

use crate::error::{AuthError, AuthResult};

/// Hashes `password` with a fresh random salt.
pub fn hash_password(password: &str) -> AuthResult<String> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes)
        .map_err(|e| AuthError::internal(format!("Failed to gather entropy: {}", e)))?;
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| AuthError::internal(format!("Failed to encode salt: {}", e)))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|phc| phc.to_string())
        .map_err(|e| AuthError::internal(format!("Failed to hash password: {}", e)))
}

/// Checks `password` against a PHC hash. Unparseable hashes never match.
pub fn verify_password(hash: &str, password: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

const DECOY_SALT: &str = "dG9rZW53YXJkZGVjb3k";

/// A hash with the default parameters that no submitted password is
/// expected to match. Verifying against it costs the same as a real check.
pub(crate) fn decoy_hash() -> &'static str {
    static DECOY: OnceCell<String> = OnceCell::new();

    DECOY.get_or_init(|| {
        SaltString::from_b64(DECOY_SALT)
            .and_then(|salt| {
                Argon2::default()
                    .hash_password(DECOY_SALT.as_bytes(), &salt)
                    .map(|phc| phc.to_string())
            })
            .unwrap_or_else(|e| {
                tracing::error!(error = %e, "Failed to build decoy password hash");
                String::new()
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("s3cret").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "s3cret"));
        assert!(!verify_password(&hash, "S3cret"));
    }

    #[test]
    fn test_salts_differ() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[test]
    fn test_garbage_hash_never_matches() {
        assert!(!verify_password("not-a-phc-string", "anything"));
    }

    #[test]
    fn test_decoy_hash_is_a_real_argon2_hash() {
        let decoy = decoy_hash();
        assert!(decoy.starts_with("$argon2"));
        assert!(PasswordHash::new(decoy).is_ok());
        assert!(!verify_password(decoy, "wonderland"));
        assert_eq!(decoy, decoy_hash());
    }
}
