// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Middleware implementations for the API server.
//!
//! - [`LoginMiddleware`]: answers the login request with token cookies
//! - [`AuthorizationMiddleware`]: installs the per-request security context

mod authorization;
mod login;

pub use authorization::{AuthorizationLayer, AuthorizationMiddleware};
pub use login::{LoginLayer, LoginMiddleware, DEFAULT_LOGIN_PATH, DEFAULT_MAX_BODY_SIZE};
