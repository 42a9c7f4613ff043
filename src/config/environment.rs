// ABOUTME: Environment configuration management for hub server and client
// ABOUTME: Parses environment variables with typed defaults and validates the result
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Environment-based configuration management

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use tracing::info;
use url::Url;

use crate::constants::{client_defaults, server_defaults, sse_defaults};
use crate::errors::{AppError, AppResult};

/// Subscription stream settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseConfig {
    /// Pending events per subscriber before new ones are dropped
    pub subscriber_capacity: usize,
    /// Interval between keepalive comments
    pub heartbeat_interval: Duration,
}

impl Default for SseConfig {
    fn default() -> Self {
        Self {
            subscriber_capacity: sse_defaults::SUBSCRIBER_QUEUE_CAPACITY,
            heartbeat_interval: Duration::from_secs(sse_defaults::HEARTBEAT_INTERVAL_SECS),
        }
    }
}

/// Hub server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// HTTP port (0 picks an ephemeral port)
    pub http_port: u16,
    /// Subscription stream settings
    pub sse: SseConfig,
    /// Upper bound on graceful shutdown
    pub shutdown_timeout: Duration,
    /// Allowed CORS origins for the request/response endpoints (`*` for any)
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: server_defaults::HOST.to_owned(),
            http_port: server_defaults::HTTP_PORT,
            sse: SseConfig::default(),
            shutdown_timeout: Duration::from_secs(server_defaults::SHUTDOWN_TIMEOUT_SECS),
            cors_origins: vec!["*".to_owned()],
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparsable or invalid value
    pub fn from_env() -> AppResult<Self> {
        info!("Loading server configuration from environment variables");

        let config = Self {
            host: env::var("HOST").unwrap_or_else(|_| server_defaults::HOST.to_owned()),
            http_port: env_parse("HTTP_PORT", server_defaults::HTTP_PORT)?,
            sse: SseConfig {
                subscriber_capacity: env_parse(
                    "SSE_SUBSCRIBER_CAPACITY",
                    sse_defaults::SUBSCRIBER_QUEUE_CAPACITY,
                )?,
                heartbeat_interval: Duration::from_secs(env_parse(
                    "SSE_HEARTBEAT_SECS",
                    sse_defaults::HEARTBEAT_INTERVAL_SECS,
                )?),
            },
            shutdown_timeout: Duration::from_secs(env_parse(
                "SHUTDOWN_TIMEOUT_SECS",
                server_defaults::SHUTDOWN_TIMEOUT_SECS,
            )?),
            cors_origins: parse_origins(&env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_owned())),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check invariants that the type system does not
    ///
    /// # Errors
    ///
    /// Returns an error for a zero queue capacity or heartbeat interval
    pub fn validate(&self) -> AppResult<()> {
        if self.sse.subscriber_capacity == 0 {
            return Err(AppError::config("SSE_SUBSCRIBER_CAPACITY must be at least 1"));
        }
        if self.sse.heartbeat_interval.is_zero() {
            return Err(AppError::config("SSE_HEARTBEAT_SECS must be at least 1"));
        }
        Ok(())
    }

    /// Socket address string to bind
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }

    /// Human-readable configuration summary for startup logs
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "MCP Stream Hub Configuration:\n\
             - Bind: {}\n\
             - Subscriber queue capacity: {}\n\
             - Heartbeat interval: {}s\n\
             - Shutdown timeout: {}s\n\
             - CORS origins: {}",
            self.bind_address(),
            self.sse.subscriber_capacity,
            self.sse.heartbeat_interval.as_secs(),
            self.shutdown_timeout.as_secs(),
            self.cors_origins.join(", "),
        )
    }
}

/// Reconnect backoff settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffConfig {
    /// Delay before the first reconnect attempt
    pub initial_delay: Duration,
    /// Ceiling for the doubling delay
    pub max_delay: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(client_defaults::RECONNECT_INITIAL_MS),
            max_delay: Duration::from_millis(client_defaults::RECONNECT_MAX_MS),
        }
    }
}

/// Reconnecting client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Hub base URL
    pub base_url: Url,
    /// Decoded events buffered for the caller
    pub event_queue_capacity: usize,
    /// Timeout for one request/response call
    pub request_timeout: Duration,
    /// Reconnect backoff
    pub backoff: BackoffConfig,
}

impl ClientConfig {
    /// Configuration with defaults for the given base URL
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            event_queue_capacity: client_defaults::EVENT_QUEUE_CAPACITY,
            request_timeout: Duration::from_secs(client_defaults::REQUEST_TIMEOUT_SECS),
            backoff: BackoffConfig::default(),
        }
    }

    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparsable or invalid value
    pub fn from_env() -> AppResult<Self> {
        let base_url = env::var("MCP_STREAM_URL")
            .unwrap_or_else(|_| client_defaults::BASE_URL.to_owned());
        let base_url = Url::parse(&base_url)
            .map_err(|e| AppError::config(format!("Invalid MCP_STREAM_URL={base_url}: {e}")))?;

        let config = Self {
            base_url,
            event_queue_capacity: env_parse(
                "CLIENT_EVENT_QUEUE_CAPACITY",
                client_defaults::EVENT_QUEUE_CAPACITY,
            )?,
            request_timeout: Duration::from_secs(env_parse(
                "CLIENT_REQUEST_TIMEOUT_SECS",
                client_defaults::REQUEST_TIMEOUT_SECS,
            )?),
            backoff: BackoffConfig {
                initial_delay: Duration::from_millis(env_parse(
                    "CLIENT_RECONNECT_INITIAL_MS",
                    client_defaults::RECONNECT_INITIAL_MS,
                )?),
                max_delay: Duration::from_millis(env_parse(
                    "CLIENT_RECONNECT_MAX_MS",
                    client_defaults::RECONNECT_MAX_MS,
                )?),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Check invariants that the type system does not
    ///
    /// # Errors
    ///
    /// Returns an error for a zero queue capacity or an inverted backoff range
    pub fn validate(&self) -> AppResult<()> {
        if self.event_queue_capacity == 0 {
            return Err(AppError::config("CLIENT_EVENT_QUEUE_CAPACITY must be at least 1"));
        }
        if self.backoff.initial_delay.is_zero() || self.backoff.initial_delay > self.backoff.max_delay
        {
            return Err(AppError::config(
                "CLIENT_RECONNECT_INITIAL_MS must be non-zero and not exceed CLIENT_RECONNECT_MAX_MS",
            ));
        }
        Ok(())
    }
}

/// Parse an environment variable, falling back to `default` when unset
fn env_parse<T>(key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    env::var(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse()
            .map_err(|e| AppError::config(format!("Invalid {key}={raw}: {e}")))
    })
}

/// Parse comma-separated CORS origins
fn parse_origins(origins: &str) -> Vec<String> {
    if origins.trim() == "*" {
        return vec!["*".to_owned()];
    }
    origins
        .split(',')
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        assert_eq!(parse_origins("*"), vec!["*"]);
        assert_eq!(
            parse_origins("http://a.test, http://b.test,,"),
            vec!["http://a.test", "http://b.test"]
        );
    }

    #[test]
    fn test_server_validation_rejects_zero_capacity() {
        let mut config = ServerConfig::default();
        assert!(config.validate().is_ok());
        config.sse.subscriber_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_client_validation_rejects_inverted_backoff() {
        let mut config = ClientConfig::new(Url::parse("http://localhost:1").unwrap());
        assert!(config.validate().is_ok());
        config.backoff.initial_delay = Duration::from_secs(60);
        config.backoff.max_delay = Duration::from_secs(1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_summary_mentions_bind_address() {
        let config = ServerConfig {
            host: "127.0.0.1".to_owned(),
            http_port: 9000,
            ..ServerConfig::default()
        };
        assert!(config.summary().contains("127.0.0.1:9000"));
    }
}
