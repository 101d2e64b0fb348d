// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Token lifetime and signing configuration.

use std::time::Duration;

use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};

use super::key::is_hmac;
use crate::error::{AuthError, AuthResult};

/// Token configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Secret key for signing tokens.
    #[serde(skip_serializing)]
    pub secret: String,
    /// Token issuer.
    pub issuer: String,
    /// Algorithm to use for signing.
    #[serde(with = "algorithm_serde")]
    pub algorithm: Algorithm,
    /// Access token lifetime.
    #[serde(with = "humantime_serde")]
    pub access_lifetime: Duration,
    /// Refresh token lifetime. Must be longer than the access lifetime.
    #[serde(with = "humantime_serde")]
    pub refresh_lifetime: Duration,
    /// Upper bound on a credential directory lookup during refresh.
    #[serde(with = "humantime_serde")]
    pub directory_timeout: Duration,
    /// Reject a refresh token the second time it is presented.
    pub single_use_refresh: bool,
    /// Maximum number of used refresh token ids remembered.
    pub refresh_guard_capacity: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: String::new(), // Must be set by user
            issuer: "tokenward".to_string(),
            algorithm: Algorithm::HS256,
            access_lifetime: Duration::from_secs(15 * 60),
            refresh_lifetime: Duration::from_secs(7 * 86_400),
            directory_timeout: Duration::from_secs(5),
            single_use_refresh: false,
            refresh_guard_capacity: 100_000,
        }
    }
}

impl TokenConfig {
    /// Creates a new configuration with the given secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Sets the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Sets the signing algorithm.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Sets the access token lifetime.
    pub fn with_access_lifetime(mut self, lifetime: Duration) -> Self {
        self.access_lifetime = lifetime;
        self
    }

    /// Sets the refresh token lifetime.
    pub fn with_refresh_lifetime(mut self, lifetime: Duration) -> Self {
        self.refresh_lifetime = lifetime;
        self
    }

    /// Sets the directory lookup timeout.
    pub fn with_directory_timeout(mut self, timeout: Duration) -> Self {
        self.directory_timeout = timeout;
        self
    }

    /// Enables or disables single-use refresh tokens.
    pub fn with_single_use_refresh(mut self, enabled: bool) -> Self {
        self.single_use_refresh = enabled;
        self
    }

    /// Access lifetime in whole seconds.
    pub fn access_lifetime_secs(&self) -> i64 {
        self.access_lifetime.as_secs() as i64
    }

    /// Refresh lifetime in whole seconds.
    pub fn refresh_lifetime_secs(&self) -> i64 {
        self.refresh_lifetime.as_secs() as i64
    }

    /// Validates the configuration.
    pub fn validate(&self) -> AuthResult<()> {
        if self.secret.is_empty() {
            return Err(AuthError::internal("Token signing secret is not configured"));
        }
        if self.issuer.is_empty() {
            return Err(AuthError::internal("Token issuer must not be empty"));
        }
        if !is_hmac(self.algorithm) {
            return Err(AuthError::internal(format!(
                "Unsupported signing algorithm {:?}",
                self.algorithm
            )));
        }
        if self.access_lifetime_secs() < 1 {
            return Err(AuthError::internal(
                "Access token lifetime must be at least one second",
            ));
        }
        if self.refresh_lifetime_secs() <= self.access_lifetime_secs() {
            return Err(AuthError::internal(
                "Refresh token lifetime must be longer than the access token lifetime",
            ));
        }
        if self.directory_timeout.is_zero() {
            return Err(AuthError::internal("Directory timeout must be positive"));
        }
        if self.single_use_refresh && self.refresh_guard_capacity == 0 {
            return Err(AuthError::internal(
                "Refresh guard capacity must be positive when single-use refresh is enabled",
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Algorithm Serialization
// =============================================================================

mod algorithm_serde {
    use jsonwebtoken::Algorithm;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(algorithm: &Algorithm, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = match algorithm {
            Algorithm::HS256 => "HS256",
            Algorithm::HS384 => "HS384",
            Algorithm::HS512 => "HS512",
            _ => return Err(serde::ser::Error::custom("only HMAC algorithms are supported")),
        };
        s.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Algorithm, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.to_uppercase().as_str() {
            "HS256" => Ok(Algorithm::HS256),
            "HS384" => Ok(Algorithm::HS384),
            "HS512" => Ok(Algorithm::HS512),
            _ => Err(serde::de::Error::custom(format!(
                "Unsupported algorithm: {}",
                s
            ))),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
