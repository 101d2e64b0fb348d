// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! tokenward binary entry point.

use tokenward_bin::cli::Cli;
use tokenward_bin::error::report_error_and_exit;
use tokenward_bin::{commands, logging};
use tokenward_config::LoggingConfig;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    // Logging settings from the config file apply unless the CLI overrides them.
    let file_logging = tokenward_config::ConfigLoader::new()
        .with_validation(false)
        .load(&cli.config)
        .map(|config| config.logging)
        .unwrap_or_else(|_| LoggingConfig::default());

    let level = cli.effective_log_level(file_logging.level.as_str()).to_string();
    let format = cli.log_format.unwrap_or_else(|| file_logging.format.into());
    logging::init_logging(&level, format, (&file_logging).into());

    if let Err(e) = commands::execute(cli).await {
        report_error_and_exit(e);
    }
}
