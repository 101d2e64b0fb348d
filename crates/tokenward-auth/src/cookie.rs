// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Login response cookies.
//!
//! Cookie lifetime is fixed at one day and is independent of the claim
//! lifetimes inside the tokens it carries.

use axum::http::HeaderValue;
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

/// Name of the access token cookie.
pub const ACCESS_COOKIE_NAME: &str = "AccessToken";

/// Name of the refresh token cookie.
pub const REFRESH_COOKIE_NAME: &str = "RefreshToken";

/// `Max-Age` of both cookies.
pub const COOKIE_MAX_AGE_SECS: u64 = 86_400;

/// `SameSite` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    /// `SameSite=Strict`
    Strict,
    /// `SameSite=Lax`
    Lax,
    /// `SameSite=None`
    None,
}

impl SameSite {
    fn as_str(self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// Optional cookie attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieConfig {
    /// Cookie path.
    pub path: String,
    /// Add the `Secure` attribute.
    pub secure: bool,
    /// `SameSite` attribute, omitted when unset.
    pub same_site: Option<SameSite>,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            path: "/".to_string(),
            secure: false,
            same_site: None,
        }
    }
}

impl CookieConfig {
    /// Builds a `Set-Cookie` value: `name=value; Max-Age=86400; Path=/; HttpOnly`.
    pub fn build(&self, name: &str, value: &str) -> AuthResult<HeaderValue> {
        let mut cookie = format!(
            "{}={}; Max-Age={}; Path={}; HttpOnly",
            name, value, COOKIE_MAX_AGE_SECS, self.path
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        if let Some(same_site) = self.same_site {
            cookie.push_str("; SameSite=");
            cookie.push_str(same_site.as_str());
        }

        HeaderValue::from_str(&cookie)
            .map_err(|e| AuthError::internal(format!("Invalid cookie value: {}", e)))
    }
}
