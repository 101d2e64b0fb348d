// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # tokenward-bin
//!
//! CLI binary for the tokenward service.
//!
//! ## Architecture
//!
//! ```text
//!                 main.rs
//!                    │
//!                 cli.rs
//!                    │
//!        ┌───────────┼───────────┐
//!        ▼           ▼           ▼
//!    commands     runtime     logging
//!                    │
//!                 shutdown
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the server (default command)
//! tokenward -c /etc/tokenward/tokenward.yaml
//!
//! # Validate configuration
//! tokenward validate --show-config
//!
//! # Generate a signing secret
//! tokenward gen-secret
//!
//! # Hash an account password
//! tokenward hash-password 'correct horse'
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod shutdown;

pub use cli::{Cli, Commands};
pub use error::{BinError, BinResult};
pub use logging::{init_logging, LogFields};
pub use runtime::{RuntimeBuilder, ServiceRuntime};
pub use shutdown::{ShutdownCoordinator, ShutdownSignal};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
