// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # tokenward Integration Tests
//!
//! Shared fixtures, mocks and a router harness for exercising the token
//! service and both request filters end to end.
//!
//! ## Module Structure
//!
//! - [`common`]: Shared test utilities
//!   - `fixtures`: Secrets, configs and seeded accounts
//!   - `mocks`: Scriptable directory and authenticator
//!   - `harness`: Router harness and response helpers
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p tokenward-tests
//! cargo test -p tokenward-tests --test integration_tokens
//! cargo test -p tokenward-tests --test integration_filters
//! cargo test -p tokenward-tests --test integration_config
//! ```
//!
//! ## Writing New Tests
//!
//! ```rust,ignore
//! use tokenward_tests::prelude::*;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let app = TestApp::new();
//!     let response = app.login("alice", "wonderland").await;
//!     assert_eq!(response.status(), StatusCode::OK);
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod common;

/// Re-export commonly used items for convenience.
pub mod prelude {
    pub use crate::common::{init_test_logging, temp_test_dir};
    pub use crate::common::fixtures::*;
    pub use crate::common::harness::*;
    pub use crate::common::mocks::*;
    pub use axum::http::StatusCode;
}
