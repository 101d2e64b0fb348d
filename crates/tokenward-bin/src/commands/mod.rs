// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI command implementations.
//!
//! - `run`: Start the server
//! - `validate`: Validate configuration file
//! - `version`: Show version information
//! - `gen-secret`: Generate a token signing secret
//! - `hash-password`: Hash a password for an account entry

mod gen_secret;
mod hash_password;
mod run;
mod validate;
mod version;

pub use gen_secret::gen_secret;
pub use hash_password::hash_password;
pub use run::run;
pub use validate::validate;
pub use version::version;

use crate::cli::{Cli, Commands};
use crate::error::BinResult;

/// Executes the appropriate command based on CLI arguments.
pub async fn execute(cli: Cli) -> BinResult<()> {
    match cli.effective_command() {
        Commands::Run(args) => run::run(&cli, args).await,
        Commands::Validate(args) => validate::validate(&cli, args),
        Commands::Version => version::version(&cli),
        Commands::GenSecret => gen_secret::gen_secret(&cli),
        Commands::HashPassword(args) => hash_password::hash_password(&cli, args).await,
    }
}
