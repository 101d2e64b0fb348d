// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `hash-password` command.

use crate::cli::{Cli, HashPasswordArgs};
use crate::error::{BinError, BinResult};

/// Prints an argon2 PHC string for an account's `password_hash`.
pub async fn hash_password(_cli: &Cli, args: HashPasswordArgs) -> BinResult<()> {
    if args.password.is_empty() {
        return Err(BinError::InvalidArgument(
            "Password must not be empty".to_string(),
        ));
    }

    let password = args.password;
    let hash = tokio::task::spawn_blocking(move || tokenward_auth::hash_password(&password))
        .await
        .map_err(|source| BinError::Task {
            task: "hashing",
            source,
        })??;

    println!("{}", hash);
    Ok(())
}
