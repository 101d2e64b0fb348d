// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration schema definitions for tokenward.
//!
//! # Schema Structure
//!
//! ```text
//! ServiceConfig
//! ├── api: ApiConfig
//! │   ├── cookies: CookieConfig
//! │   └── tokens: TokenConfig
//! ├── accounts: Vec<AccountSeed>
//! └── logging: LoggingConfig
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tokenward_auth::{hash_password, Account, ApiConfig, InMemoryAccounts, SubjectId};

use crate::error::{ConfigError, ConfigResult};

// =============================================================================
// Top-Level Configuration
// =============================================================================

/// The root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// API server configuration.
    #[serde(default)]
    pub api: ApiConfig,

    /// Accounts loaded into the in-memory directory at startup.
    #[serde(default)]
    pub accounts: Vec<AccountSeed>,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ServiceConfig {
    /// Validates the entire configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.api.validate()?;

        let mut ids = HashSet::new();
        let mut usernames = HashSet::new();
        for account in &self.accounts {
            if !ids.insert(account.id) {
                return Err(ConfigError::duplicate_account("id", account.id));
            }
            if !usernames.insert(account.username.as_str()) {
                return Err(ConfigError::duplicate_account("username", &account.username));
            }
            account.validate()?;
        }

        Ok(())
    }

    /// Builds the account store from the seeds.
    ///
    /// Plain passwords are hashed here; they never leave this function.
    pub fn build_accounts(&self) -> ConfigResult<InMemoryAccounts> {
        let accounts = InMemoryAccounts::new();
        for seed in &self.accounts {
            accounts.insert(seed.to_account()?)?;
        }
        Ok(accounts)
    }
}

// =============================================================================
// Account Seeds
// =============================================================================

/// An account declared in configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccountSeed {
    /// Subject id.
    pub id: SubjectId,

    /// Login name.
    pub username: String,

    /// Argon2 PHC hash, as produced by `tokenward hash-password`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,

    /// Plain password, for development setups only.
    #[serde(default, skip_serializing)]
    pub password: Option<String>,

    /// Role label.
    #[serde(default = "default_role")]
    pub role: String,

    /// Whether the account may authenticate.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_role() -> String {
    "USER".to_string()
}

fn default_enabled() -> bool {
    true
}

impl AccountSeed {
    /// Validates the seed.
    pub fn validate(&self) -> ConfigResult<()> {
        let field = |name: &str| format!("accounts[{}].{}", self.id, name);

        if self.username.trim().is_empty() {
            return Err(ConfigError::validation(field("username"), "must not be empty"));
        }
        if self.role.trim().is_empty() {
            return Err(ConfigError::validation(field("role"), "must not be empty"));
        }
        match (&self.password_hash, &self.password) {
            (Some(_), Some(_)) => Err(ConfigError::validation(
                field("password"),
                "set either password or password_hash, not both",
            )),
            (None, None) => Err(ConfigError::validation(
                field("password_hash"),
                "a password or password_hash is required",
            )),
            (Some(hash), None) if !hash.starts_with('$') => Err(ConfigError::validation(
                field("password_hash"),
                "expected a PHC string",
            )),
            _ => Ok(()),
        }
    }

    /// Converts the seed into a stored account.
    pub fn to_account(&self) -> ConfigResult<Account> {
        let hash = match (&self.password_hash, &self.password) {
            (Some(hash), _) => hash.clone(),
            (None, Some(plain)) => {
                tracing::warn!(
                    username = %self.username,
                    "Account configured with a plain password; use password_hash outside development"
                );
                hash_password(plain).map_err(|e| {
                    ConfigError::validation(format!("accounts[{}].password", self.id), e.to_string())
                })?
            }
            (None, None) => {
                return Err(ConfigError::validation(
                    format!("accounts[{}].password_hash", self.id),
                    "a password or password_hash is required",
                ))
            }
        };

        Ok(Account::new(self.id, &self.username, hash, &self.role).with_enabled(self.enabled))
    }
}

impl std::fmt::Debug for AccountSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountSeed")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("role", &self.role)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Logging Configuration
// =============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Log format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include span targets in logs.
    #[serde(default = "default_enabled")]
    pub with_target: bool,

    /// Include file/line in logs.
    #[serde(default)]
    pub with_file: bool,

    /// Include thread IDs in logs.
    #[serde(default)]
    pub with_thread_ids: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            with_target: true,
            with_file: false,
            with_thread_ids: false,
        }
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Returns the filter directive for this level.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Parses a level name, accepting `warning` for `warn`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Compact single-line text.
    Compact,
    /// JSON lines.
    Json,
}

// =============================================================================
// Tests
// =============================================================================
