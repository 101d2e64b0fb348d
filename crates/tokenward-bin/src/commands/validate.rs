// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use tokenward_auth::MIN_SECRET_LEN;
use tokenward_config::ServiceConfig;

use crate::cli::{Cli, OutputFormat, ValidateArgs};
use crate::error::{BinError, BinResult};

/// Executes the `validate` command to validate configuration.
pub fn validate(cli: &Cli, args: ValidateArgs) -> BinResult<()> {
    let config_path = &cli.config;

    let config =
        tokenward_config::load_config(config_path).map_err(|source| BinError::LoadConfig {
            path: config_path.clone(),
            source,
        })?;

    let warnings = collect_warnings(&config);

    match args.format {
        OutputFormat::Text => {
            println!("✓ Configuration is valid: {}", config_path.display());
            println!();
            println!("Summary:");
            println!("  Listen:          {}", config.api.socket_addr());
            println!("  Login path:      {}", config.api.login_path);
            println!("  Refresh path:    {}", config.api.refresh_path);
            println!("  Issuer:          {}", config.api.tokens.issuer);
            println!("  Access lifetime: {:?}", config.api.tokens.access_lifetime);
            println!("  Refresh lifetime: {:?}", config.api.tokens.refresh_lifetime);
            println!(
                "  Single-use refresh: {}",
                if config.api.tokens.single_use_refresh { "enabled" } else { "disabled" }
            );
            println!("  Accounts:        {}", config.accounts.len());

            if !warnings.is_empty() {
                println!();
                println!("Warnings:");
                for warning in &warnings {
                    println!("  ⚠ {}", warning);
                }
            }

            if args.show_config {
                println!();
                println!("Parsed configuration:");
                println!("{}", render_config(&config)?);
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "valid": true,
                "config_path": config_path.display().to_string(),
                "summary": {
                    "listen": config.api.socket_addr().to_string(),
                    "login_path": config.api.login_path,
                    "refresh_path": config.api.refresh_path,
                    "issuer": config.api.tokens.issuer,
                    "access_lifetime_secs": config.api.tokens.access_lifetime_secs(),
                    "refresh_lifetime_secs": config.api.tokens.refresh_lifetime_secs(),
                    "single_use_refresh": config.api.tokens.single_use_refresh,
                    "account_count": config.accounts.len(),
                },
                "warnings": warnings,
                "config": if args.show_config { Some(&config) } else { None },
            });
            let rendered = serde_json::to_string_pretty(&output)?;
            println!("{}", rendered);
        }
    }

    Ok(())
}

/// Non-fatal findings worth surfacing before deployment.
pub fn collect_warnings(config: &ServiceConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.accounts.is_empty() {
        warnings.push("No accounts configured; every login will be rejected".to_string());
    }
    if config.accounts.iter().any(|a| a.password.is_some()) {
        warnings.push("Some accounts use a plain password instead of password_hash".to_string());
    }
    if config.api.tokens.secret.len() < MIN_SECRET_LEN {
        warnings.push(format!(
            "Token secret is shorter than {} bytes",
            MIN_SECRET_LEN
        ));
    }
    if !config.api.cookies.secure {
        warnings.push("Login cookies are not marked Secure".to_string());
    }

    warnings
}

fn render_config(config: &ServiceConfig) -> BinResult<String> {
    Ok(serde_json::to_string_pretty(config)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokenward_auth::TokenConfig;

    #[test]
    fn test_collect_warnings() {
        let mut config = ServiceConfig::default();
        config.api.tokens = TokenConfig::new("short");

        let warnings = collect_warnings(&config);
        assert!(warnings.iter().any(|w| w.contains("No accounts")));
        assert!(warnings.iter().any(|w| w.contains("shorter than")));
        assert!(warnings.iter().any(|w| w.contains("Secure")));
    }

    #[test]
    fn test_rendered_config_hides_secrets() {
        let mut config = ServiceConfig::default();
        config.api.tokens = TokenConfig::new("do-not-print-this-secret-anywhere!!");

        let rendered = render_config(&config).unwrap();
        assert!(!rendered.contains("do-not-print-this-secret-anywhere!!"));
    }
}
