// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `gen-secret` command.

use tokenward_auth::SigningKey;

use crate::cli::Cli;
use crate::error::BinResult;

/// Prints a fresh base64 signing secret for `api.tokens.secret`.
pub fn gen_secret(_cli: &Cli) -> BinResult<()> {
    let secret = SigningKey::generate_secret()?;
    println!("{}", secret);
    Ok(())
}
