// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API handlers.
//!
//! - [`health`]: liveness and fallback
//! - [`auth`]: refresh and current identity
//!
//! Login has no handler; the login middleware answers it.

mod auth;
mod health;

pub use auth::*;
pub use health::*;
