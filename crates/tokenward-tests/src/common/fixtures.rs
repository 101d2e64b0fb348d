// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Fixtures
//!
//! Pre-built secrets, configurations and accounts shared by the
//! integration suites.

use std::sync::Arc;
use std::time::Duration;

use tokenward_auth::{ApiConfig, InMemoryAccounts, Principal, SubjectId, TokenConfig};

/// Signing secret used by most tests.
pub const TEST_SECRET: &str = "integration-test-secret-key-that-is-long-enough";

/// A different secret, for signature mismatch tests.
pub const OTHER_SECRET: &str = "another-integration-secret-that-is-also-long";

/// Subject id of the default user.
pub const ALICE_ID: SubjectId = 42;
/// Username of the default user.
pub const ALICE_USERNAME: &str = "alice";
/// Password of the default user.
pub const ALICE_PASSWORD: &str = "wonderland";

/// Subject id of the admin user.
pub const ROOT_ID: SubjectId = 1;
/// Username of the admin user.
pub const ROOT_USERNAME: &str = "root";
/// Password of the admin user.
pub const ROOT_PASSWORD: &str = "toor";

/// Subject id of the disabled user.
pub const MALLORY_ID: SubjectId = 666;
/// Username of the disabled user.
pub const MALLORY_USERNAME: &str = "mallory";
/// Password of the disabled user.
pub const MALLORY_PASSWORD: &str = "letmein";

/// Token configuration fixtures.
pub struct TokenFixtures;

impl TokenFixtures {
    /// Default lifetimes with the test secret.
    pub fn config() -> TokenConfig {
        TokenConfig::new(TEST_SECRET)
    }

    /// Configuration signed with [`OTHER_SECRET`].
    pub fn other_secret() -> TokenConfig {
        TokenConfig::new(OTHER_SECRET)
    }

    /// One-second access tokens and two-second refresh tokens.
    pub fn short_lived() -> TokenConfig {
        TokenConfig::new(TEST_SECRET)
            .with_access_lifetime(Duration::from_secs(1))
            .with_refresh_lifetime(Duration::from_secs(2))
    }

    /// Refresh tokens are rejected on second use.
    pub fn single_use() -> TokenConfig {
        TokenConfig::new(TEST_SECRET).with_single_use_refresh(true)
    }

    /// Directory lookups time out after `timeout`.
    pub fn with_directory_timeout(timeout: Duration) -> TokenConfig {
        TokenConfig::new(TEST_SECRET).with_directory_timeout(timeout)
    }
}

/// API configuration fixtures.
pub struct ApiFixtures;

impl ApiFixtures {
    /// Default API settings with the given token configuration.
    pub fn config(tokens: TokenConfig) -> ApiConfig {
        ApiConfig::default().with_tokens(tokens)
    }
}

/// Account fixtures.
pub struct AccountFixtures;

impl AccountFixtures {
    /// Alice (USER), root (ADMIN) and a disabled mallory (USER).
    pub fn seeded() -> Arc<InMemoryAccounts> {
        let accounts = InMemoryAccounts::new();
        accounts
            .add_user(ALICE_ID, ALICE_USERNAME, ALICE_PASSWORD, "USER")
            .expect("Failed to seed alice");
        accounts
            .add_user(ROOT_ID, ROOT_USERNAME, ROOT_PASSWORD, "ADMIN")
            .expect("Failed to seed root");
        accounts
            .add_user(MALLORY_ID, MALLORY_USERNAME, MALLORY_PASSWORD, "USER")
            .expect("Failed to seed mallory");
        accounts.set_enabled(MALLORY_ID, false);
        Arc::new(accounts)
    }

    /// Principal for alice.
    pub fn alice() -> Principal {
        Principal::new(ALICE_ID, "USER")
    }

    /// Principal for root.
    pub fn root() -> Principal {
        Principal::new(ROOT_ID, "ADMIN")
    }
}
