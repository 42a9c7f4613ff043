// ABOUTME: Logging configuration and structured logging setup
// ABOUTME: Builds the tracing subscriber for the hub and client binaries from the environment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Logging configuration with structured output
//!
//! The hub logs to stdout. The client CLI prints command results on stdout,
//! so its logs go to stderr instead.

use std::env;
use std::io;

use tracing::info;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan, writer::BoxMakeWriter},
    layer::SubscriberExt,
    registry::Registry,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::constants::service_names;
use crate::errors::{AppError, AppResult};

/// Directives appended to every filter to quiet HTTP internals
const NOISE_DIRECTIVES: [&str; 4] = [
    "hyper=warn",
    "hyper_util=warn",
    "reqwest=warn",
    "tower_http=info",
];

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// `JSON` lines for log shippers
    Json,
    /// Multi-field human format
    Pretty,
    /// One short line per event
    Compact,
}

impl LogFormat {
    fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some("json") => Self::Json,
            Some("compact") => Self::Compact,
            _ => Self::Pretty,
        }
    }
}

/// Stream that receives log output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogWriter {
    /// Standard output
    Stdout,
    /// Standard error
    Stderr,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level or filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// Output format
    pub format: LogFormat,
    /// Output stream
    pub writer: LogWriter,
    /// Include source file and line numbers
    pub include_location: bool,
    /// Emit span open/close events
    pub include_spans: bool,
    /// Service name for structured logging
    pub service_name: String,
    /// Service version
    pub service_version: String,
    /// Deployment environment (development, staging, production)
    pub environment: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
            writer: LogWriter::Stdout,
            include_location: false,
            include_spans: false,
            service_name: service_names::MCP_STREAM_HUB.into(),
            service_version: env!("CARGO_PKG_VERSION").to_owned(),
            environment: "development".into(),
        }
    }
}

impl LoggingConfig {
    /// Configuration for `service_name` from `RUST_LOG`, `LOG_FORMAT`,
    /// `ENVIRONMENT`, `LOG_INCLUDE_LOCATION` and `LOG_INCLUDE_SPANS`
    ///
    /// The client service logs to stderr; every other service to stdout.
    #[must_use]
    pub fn from_env(service_name: &str) -> Self {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let is_production = environment == "production";
        let writer = if service_name == service_names::MCP_STREAM_CLIENT {
            LogWriter::Stderr
        } else {
            LogWriter::Stdout
        };

        Self {
            level: env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
            format: LogFormat::from_env_value(env::var("LOG_FORMAT").ok().as_deref()),
            writer,
            include_location: is_production || env::var("LOG_INCLUDE_LOCATION").is_ok(),
            include_spans: env::var("LOG_INCLUDE_SPANS").is_ok(),
            service_name: service_name.to_owned(),
            service_version: env!("CARGO_PKG_VERSION").to_owned(),
            environment,
        }
    }

    fn env_filter(&self) -> EnvFilter {
        NOISE_DIRECTIVES
            .into_iter()
            .fold(EnvFilter::new(&self.level), |filter, directive| {
                match directive.parse() {
                    Ok(parsed) => filter.add_directive(parsed),
                    Err(_) => filter,
                }
            })
    }

    fn make_writer(&self) -> BoxMakeWriter {
        match self.writer {
            LogWriter::Stdout => BoxMakeWriter::new(io::stdout),
            LogWriter::Stderr => BoxMakeWriter::new(io::stderr),
        }
    }

    fn fmt_layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let span_events = if self.include_spans {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };
        let layer = fmt::layer()
            .with_writer(self.make_writer())
            .with_file(self.include_location)
            .with_line_number(self.include_location)
            .with_span_events(span_events);

        match self.format {
            LogFormat::Json => layer.json().boxed(),
            LogFormat::Pretty => layer.with_target(true).boxed(),
            LogFormat::Compact => layer.compact().with_target(false).boxed(),
        }
    }

    /// Install the global tracing subscriber
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber is already installed
    pub fn init(&self) -> AppResult<()> {
        tracing_subscriber::registry()
            .with(self.fmt_layer())
            .with(self.env_filter())
            .try_init()
            .map_err(|e| AppError::internal(format!("Failed to install logger: {e}")))?;

        info!(
            service.name = %self.service_name,
            service.version = %self.service_version,
            environment = %self.environment,
            log.level = %self.level,
            log.format = ?self.format,
            "Logging initialized"
        );
        Ok(())
    }
}

/// Initialize logging from environment for the named service
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed
pub fn init_from_env(service_name: &str) -> AppResult<()> {
    LoggingConfig::from_env(service_name).init()
}
