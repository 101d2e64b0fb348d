// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # tokenward-auth
//!
//! Token-based authentication and request authorization.
//!
//! This crate issues access/refresh token pairs after a login, validates
//! bearer tokens on every request into a per-request [`SecurityContext`],
//! and rotates pairs on refresh while re-reading role and enablement from a
//! [`CredentialDirectory`].
//!
//! ## Request pipeline
//!
//! ```text
//! trace -> timeout -> LoginLayer -> AuthorizationLayer -> routes
//! ```
//!
//! - `POST /login` is answered by [`LoginLayer`] with `AccessToken` and
//!   `RefreshToken` cookies.
//! - Every other request gets a [`SecurityContext`], authenticated or not.
//!   Handlers taking the [`Auth`] extractor reject anonymous callers.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod clock;
pub mod config;
pub mod context;
pub mod cookie;
pub mod directory;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod principal;
pub mod server;
pub mod state;
pub mod token;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::ApiConfig;
pub use context::{Identity, SecurityContext};
pub use cookie::{CookieConfig, SameSite, ACCESS_COOKIE_NAME, COOKIE_MAX_AGE_SECS, REFRESH_COOKIE_NAME};
pub use directory::{
    hash_password, verify_password, Account, AuthenticationManager, CredentialDirectory,
    DirectoryEntry, DirectoryError, InMemoryAccounts,
};
pub use error::{AuthError, AuthResult, ErrorBody};
pub use extractors::{Auth, CurrentContext, OptionalAuth};
pub use middleware::{AuthorizationLayer, LoginLayer};
pub use principal::{Credentials, Principal, SubjectId, TokenPair};
pub use server::AuthServer;
pub use state::{AppState, AppStateBuilder};
pub use token::{SigningKey, TokenConfig, TokenService, MIN_SECRET_LEN};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
