// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # tokenward-config
//!
//! Configuration management for the tokenward service.
//!
//! ## Features
//!
//! - **Schema**: server, token, cookie, account and logging settings
//! - **Multi-Format Support**: YAML, TOML, and JSON configuration files
//! - **Environment Overrides**: `TOKENWARD_*` variables and `${VAR}` placeholders
//!
//! ## Quick Start
//!
//! ```no_run
//! use tokenward_config::loader::load_config;
//!
//! let config = load_config("tokenward.yaml").unwrap();
//!
//! println!("Listening on {}", config.api.socket_addr());
//! println!("Accounts: {}", config.accounts.len());
//! ```
//!
//! ## Configuration Schema
//!
//! - `api` - listener, paths, cookies and token settings
//! - `accounts` - accounts seeded into the in-memory directory
//! - `logging` - log level and format

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod loader;
pub mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_config, load_config_str, ConfigFormat, ConfigLoader, ConfigLoaderBuilder};
pub use schema::{AccountSeed, LogFormat, LogLevel, LoggingConfig, ServiceConfig};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
