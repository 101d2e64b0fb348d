// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and command definitions.
//!
//! - `run`: Start the server (default)
//! - `validate`: Validate configuration file
//! - `version`: Show version information
//! - `gen-secret`: Generate a token signing secret
//! - `hash-password`: Hash a password for an account entry

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// =============================================================================
// Main CLI Structure
// =============================================================================

/// tokenward - token issuance and request authorization
#[derive(Parser, Debug)]
#[command(
    name = "tokenward",
    author = "Sylvex <contact@sylvex.io>",
    version = tokenward_auth::VERSION,
    about = "Token issuance, validation and refresh layer for HTTP services",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Configuration file path
    #[arg(
        short,
        long,
        default_value = "tokenward.yaml",
        env = "TOKENWARD_CONFIG",
        global = true
    )]
    pub config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(short, long, env = "TOKENWARD_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Log format (text, json, compact); overrides the config file
    #[arg(long, env = "TOKENWARD_LOG_FORMAT", global = true)]
    pub log_format: Option<LogFormat>,

    /// Enable quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

// =============================================================================
// Subcommands
// =============================================================================

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the server
    ///
    /// This is the default command when no subcommand is specified.
    Run(RunArgs),

    /// Validate the configuration file
    ///
    /// Parses and validates the configuration file without starting the server.
    Validate(ValidateArgs),

    /// Show detailed version information
    Version,

    /// Generate a random token signing secret
    #[command(name = "gen-secret")]
    GenSecret,

    /// Hash a password for use as an account `password_hash`
    #[command(name = "hash-password")]
    HashPassword(HashPasswordArgs),
}

// =============================================================================
// Command Arguments
// =============================================================================

/// Arguments for the `run` command.
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Override the listen port
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Arguments for the `validate` command.
#[derive(Args, Debug, Default, Clone)]
pub struct ValidateArgs {
    /// Show parsed configuration after validation
    #[arg(short, long)]
    pub show_config: bool,

    /// Output format for validation results
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the `hash-password` command.
#[derive(Args, Debug, Clone)]
pub struct HashPasswordArgs {
    /// Password to hash
    pub password: String,
}

// =============================================================================
// Enums
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for structured logging
    Json,
    /// Compact format for minimal output
    Compact,
}

impl From<tokenward_config::LogFormat> for LogFormat {
    fn from(format: tokenward_config::LogFormat) -> Self {
        match format {
            tokenward_config::LogFormat::Text => LogFormat::Text,
            tokenward_config::LogFormat::Json => LogFormat::Json,
            tokenward_config::LogFormat::Compact => LogFormat::Compact,
        }
    }
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for programmatic parsing
    Json,
}

// =============================================================================
// Helper Methods
// =============================================================================

impl Cli {
    /// Parse CLI arguments from the command line.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective command, defaulting to `Run` if none specified.
    pub fn effective_command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or_else(|| Commands::Run(RunArgs::default()))
    }

    /// Get the effective log level, falling back to `default` when no flag
    /// was given.
    pub fn effective_log_level<'a>(&'a self, default: &'a str) -> &'a str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            self.log_level.as_deref().unwrap_or(default)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command() {
        let cli = Cli::parse_from(["tokenward"]);
        assert!(cli.command.is_none());
        assert!(matches!(cli.effective_command(), Commands::Run(_)));
    }

    #[test]
    fn test_run_port_override() {
        let cli = Cli::parse_from(["tokenward", "run", "-p", "9090"]);
        match cli.command {
            Some(Commands::Run(args)) => assert_eq!(args.port, Some(9090)),
            other => panic!("Expected Run command, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_command() {
        let cli = Cli::parse_from(["tokenward", "validate", "--show-config", "-f", "json"]);
        match cli.command {
            Some(Commands::Validate(args)) => {
                assert!(args.show_config);
                assert_eq!(args.format, OutputFormat::Json);
            }
            other => panic!("Expected Validate command, got {:?}", other),
        }
    }

    #[test]
    fn test_config_path() {
        let cli = Cli::parse_from(["tokenward", "-c", "/etc/tokenward/config.yaml"]);
        assert_eq!(cli.config, PathBuf::from("/etc/tokenward/config.yaml"));
    }

    #[test]
    fn test_log_level() {
        let cli = Cli::parse_from(["tokenward", "-l", "debug"]);
        assert_eq!(cli.effective_log_level("info"), "debug");

        let cli = Cli::parse_from(["tokenward", "-q"]);
        assert_eq!(cli.effective_log_level("info"), "warn");

        let cli = Cli::parse_from(["tokenward", "-v"]);
        assert_eq!(cli.effective_log_level("info"), "debug");
    }

    #[test]
    fn test_hash_password_command() {
        let cli = Cli::parse_from(["tokenward", "hash-password", "hunter2"]);
        match cli.command {
            Some(Commands::HashPassword(args)) => assert_eq!(args.password, "hunter2"),
            other => panic!("Expected HashPassword command, got {:?}", other),
        }
    }

    #[test]
    fn test_gen_secret_command() {
        let cli = Cli::parse_from(["tokenward", "gen-secret"]);
        assert!(matches!(cli.command, Some(Commands::GenSecret)));
    }

    #[test]
    fn test_log_format_from_config() {
        assert_eq!(LogFormat::from(tokenward_config::LogFormat::Json), LogFormat::Json);
    }
}
