// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API server configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cookie::CookieConfig;
use crate::error::{AuthError, AuthResult};
use crate::middleware::{DEFAULT_LOGIN_PATH, DEFAULT_MAX_BODY_SIZE};
use crate::token::TokenConfig;

/// Default refresh endpoint.
pub const DEFAULT_REFRESH_PATH: &str = "/auth/refresh";

// =============================================================================
// ApiConfig
// =============================================================================

/// Configuration for the API server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host address.
    pub host: IpAddr,
    /// Server port.
    pub port: u16,
    /// Path intercepted by the login middleware.
    pub login_path: String,
    /// Path of the refresh endpoint.
    pub refresh_path: String,
    /// Request timeout.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Graceful shutdown timeout.
    #[serde(with = "humantime_serde")]
    pub shutdown_timeout: Duration,
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
    /// Login cookie attributes.
    pub cookies: CookieConfig,
    /// Token configuration.
    pub tokens: TokenConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 8080,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            request_timeout: Duration::from_secs(30),
            shutdown_timeout: Duration::from_secs(30),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            cookies: CookieConfig::default(),
            tokens: TokenConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Sets the host address.
    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    /// Sets the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the token configuration.
    pub fn with_tokens(mut self, tokens: TokenConfig) -> Self {
        self.tokens = tokens;
        self
    }

    /// Sets the cookie attributes.
    pub fn with_cookies(mut self, cookies: CookieConfig) -> Self {
        self.cookies = cookies;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> AuthResult<()> {
        for (name, path) in [
            ("login_path", &self.login_path),
            ("refresh_path", &self.refresh_path),
        ] {
            if !path.starts_with('/') {
                return Err(AuthError::internal(format!(
                    "{} must start with '/': {}",
                    name, path
                )));
            }
        }
        if self.login_path == self.refresh_path {
            return Err(AuthError::internal(
                "login_path and refresh_path must differ",
            ));
        }
        if self.max_body_size == 0 {
            return Err(AuthError::internal("max_body_size must be positive"));
        }
        if self.request_timeout.is_zero() {
            return Err(AuthError::internal("request_timeout must be positive"));
        }
        self.tokens.validate()
    }
}
