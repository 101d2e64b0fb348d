// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Token module.
//!
//! This module provides:
//! - The immutable signing key
//! - Typed access and refresh claims
//! - The signed token codec
//! - The token lifecycle service

mod claims;
mod codec;
mod config;
mod guard;
mod key;
mod service;

pub use claims::{AccessClaims, RefreshClaims, SubjectClaims, TimedClaims, TokenKind};
pub use codec::TokenCodec;
pub use config::TokenConfig;
pub use guard::RefreshGuard;
pub use key::{SigningKey, MIN_SECRET_LEN};
pub use service::TokenService;
