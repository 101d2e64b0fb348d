// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for the tokenward binary.

use std::path::PathBuf;

use thiserror::Error;
use tokenward_auth::AuthError;
use tokenward_config::ConfigError;

/// Result type alias for tokenward-bin operations.
pub type BinResult<T> = Result<T, BinError>;

/// Exit code for configuration problems.
pub const EXIT_CONFIG: i32 = 1;
/// Exit code for rejected command arguments, as clap uses.
pub const EXIT_USAGE: i32 = 2;
/// Exit code when the server could not be assembled.
pub const EXIT_STARTUP: i32 = 3;
/// Exit code for failures after startup.
pub const EXIT_RUNTIME: i32 = 4;

/// Errors surfaced by the `tokenward` commands.
#[derive(Debug, Error)]
pub enum BinError {
    /// The configuration file could not be loaded or failed validation.
    #[error("Failed to load {}", path.display())]
    LoadConfig {
        /// File that was read.
        path: PathBuf,
        /// Loader error.
        #[source]
        source: ConfigError,
    },

    /// Loaded configuration could not be turned into accounts.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The runtime was built without a config file or value.
    #[error("No configuration provided")]
    MissingConfig,

    /// A command argument was rejected.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The token service or router could not be assembled.
    #[error("Failed to start: {0}")]
    Startup(#[source] AuthError),

    /// Failure from the auth layer while serving or hashing.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A spawned task panicked or was cancelled.
    #[error("{task} task failed")]
    Task {
        /// Which task.
        task: &'static str,
        /// Join failure.
        #[source]
        source: tokio::task::JoinError,
    },

    /// JSON output could not be rendered.
    #[error("Failed to render output: {0}")]
    Render(#[from] serde_json::Error),
}

impl BinError {
    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::LoadConfig { .. } | Self::Config(_) | Self::MissingConfig => EXIT_CONFIG,
            Self::InvalidArgument(_) => EXIT_USAGE,
            Self::Startup(_) => EXIT_STARTUP,
            Self::Auth(_) | Self::Task { .. } | Self::Render(_) => EXIT_RUNTIME,
        }
    }
}

// =============================================================================
// Error Reporting
// =============================================================================

/// Reports an error with its cause chain on stderr.
pub fn report_error(error: &BinError) {
    eprintln!("Error: {}", error);

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("  Caused by: {}", cause);
        source = cause.source();
    }
}

/// Reports an error and exits with the appropriate code.
pub fn report_error_and_exit(error: BinError) -> ! {
    report_error(&error);
    std::process::exit(error.exit_code())
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn test_load_config_names_the_file() {
        let err = BinError::LoadConfig {
            path: PathBuf::from("/etc/tokenward.yaml"),
            source: ConfigError::file_not_found("/etc/tokenward.yaml"),
        };
        assert_eq!(err.to_string(), "Failed to load /etc/tokenward.yaml");
        assert!(err.source().is_some());
        assert_eq!(err.exit_code(), EXIT_CONFIG);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(BinError::MissingConfig.exit_code(), EXIT_CONFIG);
        assert_eq!(
            BinError::InvalidArgument("empty".into()).exit_code(),
            EXIT_USAGE
        );
        assert_eq!(
            BinError::Startup(AuthError::internal("no secret")).exit_code(),
            EXIT_STARTUP
        );
        assert_eq!(
            BinError::from(AuthError::internal("boom")).exit_code(),
            EXIT_RUNTIME
        );
    }
}
