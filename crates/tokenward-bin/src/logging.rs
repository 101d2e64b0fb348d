// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Logging and tracing initialization.

use tokenward_config::LoggingConfig;
use tracing::Subscriber;
use tracing_subscriber::{
    filter::Directive,
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::cli::LogFormat;

/// Noisy dependency targets capped below the requested level.
const QUIET_TARGETS: &[&str] = &["hyper=warn", "tower=warn", "axum=info", "tokio=info"];

/// Optional fields printed with every event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogFields {
    /// Event target.
    pub target: bool,
    /// Source file and line.
    pub file: bool,
    /// Thread id.
    pub thread_ids: bool,
}

impl Default for LogFields {
    fn default() -> Self {
        Self::from(&LoggingConfig::default())
    }
}

impl From<&LoggingConfig> for LogFields {
    fn from(config: &LoggingConfig) -> Self {
        Self {
            target: config.with_target,
            file: config.with_file,
            thread_ids: config.with_thread_ids,
        }
    }
}

// =============================================================================
// Logging Initialization
// =============================================================================

/// Initializes the logging subsystem.
///
/// `RUST_LOG` takes precedence over `level` when set. Calling this twice
/// is harmless; the second subscriber is ignored.
///
/// # Example
///
/// ```ignore
/// use tokenward_bin::logging::{init_logging, LogFields};
/// use tokenward_bin::cli::LogFormat;
///
/// init_logging("info", LogFormat::Text, LogFields::default());
/// ```
pub fn init_logging(level: &str, format: LogFormat, fields: LogFields) {
    let ansi = format != LogFormat::Json && std::io::IsTerminal::is_terminal(&std::io::stdout());

    let result = tracing_subscriber::registry()
        .with(build_filter(level))
        .with(fmt_layer(format, fields, std::io::stdout, ansi))
        .try_init();

    if let Err(e) = result {
        eprintln!("Logging already initialized: {}", e);
    }
}

/// Builds the formatting layer for `format` writing to `writer`.
pub fn fmt_layer<S, W>(
    format: LogFormat,
    fields: LogFields,
    writer: W,
    ansi: bool,
) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(fields.target)
        .with_file(fields.file)
        .with_line_number(fields.file)
        .with_thread_ids(fields.thread_ids);

    match format {
        LogFormat::Text => layer.boxed(),
        LogFormat::Compact => layer.compact().boxed(),
        LogFormat::Json => layer
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .boxed(),
    }
}

/// Builds the filter from `RUST_LOG` or the given level.
pub fn build_filter(level: &str) -> EnvFilter {
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    for directive in QUIET_TARGETS {
        if let Ok(directive) = directive.parse::<Directive>() {
            filter = filter.add_directive(directive);
        }
    }
    filter
}

// =============================================================================
// Tests
// =============================================================================
