// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application state shared across handlers.

use std::sync::Arc;

use crate::clock::Clock;
use crate::config::ApiConfig;
use crate::directory::{AuthenticationManager, CredentialDirectory, InMemoryAccounts};
use crate::error::{AuthError, AuthResult};
use crate::token::TokenService;

// =============================================================================
// AppState
// =============================================================================

/// Application state shared across all handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: Arc<ApiConfig>,
    /// Token lifecycle service.
    pub tokens: TokenService,
    /// Login credential verifier.
    pub authenticator: Arc<dyn AuthenticationManager>,
}

impl AppState {
    /// Creates a new app state builder.
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }

    /// Returns the token service.
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Returns the authentication manager.
    pub fn authenticator(&self) -> &Arc<dyn AuthenticationManager> {
        &self.authenticator
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// AppStateBuilder
// =============================================================================

/// Builder for constructing AppState.
#[derive(Default)]
pub struct AppStateBuilder {
    config: Option<ApiConfig>,
    directory: Option<Arc<dyn CredentialDirectory>>,
    authenticator: Option<Arc<dyn AuthenticationManager>>,
    clock: Option<Arc<dyn Clock>>,
}

impl AppStateBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the credential directory consulted on refresh.
    pub fn directory(mut self, directory: Arc<dyn CredentialDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Sets the login credential verifier.
    pub fn authenticator(mut self, authenticator: Arc<dyn AuthenticationManager>) -> Self {
        self.authenticator = Some(authenticator);
        self
    }

    /// Uses one account store as both directory and authenticator.
    pub fn accounts(self, accounts: Arc<InMemoryAccounts>) -> Self {
        self.directory(accounts.clone()).authenticator(accounts)
    }

    /// Overrides the time source.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Builds the AppState.
    pub fn build(self) -> AuthResult<AppState> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let directory = self
            .directory
            .ok_or_else(|| AuthError::internal("Credential directory is not configured"))?;
        let authenticator = self
            .authenticator
            .ok_or_else(|| AuthError::internal("Authentication manager is not configured"))?;

        let mut tokens = TokenService::new(config.tokens.clone(), directory)?;
        if let Some(clock) = self.clock {
            tokens = tokens.with_clock(clock);
        }

        Ok(AppState {
            config: Arc::new(config),
            tokens,
            authenticator,
        })
    }
}

// =============================================================================
// FromRef implementations for extracting parts of state
// =============================================================================

impl axum::extract::FromRef<AppState> for TokenService {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

impl axum::extract::FromRef<AppState> for Arc<ApiConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

// =============================================================================
// Tests
// =============================================================================
