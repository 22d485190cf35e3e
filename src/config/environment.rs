// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Handles environment variables, deployment modes, and runtime configuration parsing
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Environment-based configuration management for production deployment

use crate::constants::{DEFAULT_CHANNEL, DEFAULT_CHANNEL_CAPACITY};
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

/// Environment type for security and logging defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Top-level server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface the HTTP listener binds
    pub host: String,
    /// HTTP API port
    pub http_port: u16,
    /// Authorization settings
    pub auth: AuthConfig,
    /// Streaming channel settings
    pub streams: StreamConfig,
    /// Include diagnostic chains in error bodies
    pub debug: bool,
    /// Deployment environment
    pub environment: Environment,
}

/// Authorization configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Reject requests without a valid API key
    pub require_key: bool,
    /// JSON file holding the accepted API keys
    pub keys_file: Option<PathBuf>,
}

/// Streaming channel configuration
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Channels registered at startup
    pub channels: Vec<String>,
    /// Broadcast buffer depth per channel
    pub channel_capacity: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable fails to parse or the resulting
    /// configuration does not validate
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let config = Self {
            host: env_var_or("EVENTGATE_HOST", "127.0.0.1")?,
            http_port: env_var_or("EVENTGATE_HTTP_PORT", "8100")?
                .parse()
                .context("Invalid EVENTGATE_HTTP_PORT value")?,

            auth: AuthConfig {
                require_key: env_var_or("EVENTGATE_REQUIRE_API_KEY", "false")?
                    .parse()
                    .context("Invalid EVENTGATE_REQUIRE_API_KEY value")?,
                keys_file: env::var("EVENTGATE_API_KEYS_FILE").ok().map(PathBuf::from),
            },

            streams: StreamConfig {
                channels: parse_channels(&env_var_or("EVENTGATE_CHANNELS", DEFAULT_CHANNEL)?),
                channel_capacity: env_var_or(
                    "EVENTGATE_CHANNEL_CAPACITY",
                    &DEFAULT_CHANNEL_CAPACITY.to_string(),
                )?
                .parse()
                .context("Invalid EVENTGATE_CHANNEL_CAPACITY value")?,
            },

            debug: env_var_or("EVENTGATE_DEBUG", "false")?
                .parse()
                .context("Invalid EVENTGATE_DEBUG value")?,

            environment: Environment::from_str_or_default(&env_var_or(
                "ENVIRONMENT",
                "development",
            )?),
        };

        config.validate()?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error if required keys are enabled without a key source,
    /// or the stream settings are unusable
    pub fn validate(&self) -> Result<()> {
        // A key requirement without a key source would turn every request
        // into a 403; fail at startup instead
        if self.auth.require_key && self.auth.keys_file.is_none() {
            return Err(anyhow::anyhow!(
                "EVENTGATE_REQUIRE_API_KEY is set but EVENTGATE_API_KEYS_FILE is not configured"
            ));
        }

        if self.streams.channels.is_empty() {
            return Err(anyhow::anyhow!(
                "EVENTGATE_CHANNELS must name at least one channel"
            ));
        }

        if self.streams.channel_capacity == 0 {
            return Err(anyhow::anyhow!(
                "EVENTGATE_CHANNEL_CAPACITY must be greater than zero"
            ));
        }

        if self.environment.is_production() && !self.auth.require_key {
            warn!("Running in production without API key requirement");
        }

        Ok(())
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Eventgate Configuration:\n\
             - Host: {}\n\
             - HTTP Port: {}\n\
             - API Key Auth: {}\n\
             - Key File: {}\n\
             - Channels: {}\n\
             - Channel Capacity: {}\n\
             - Debug Error Bodies: {}\n\
             - Environment: {}",
            self.host,
            self.http_port,
            if self.auth.require_key {
                "Required"
            } else {
                "Optional"
            },
            self.auth
                .keys_file
                .as_ref()
                .map_or_else(|| "None".to_owned(), |p| p.display().to_string()),
            self.streams.channels.join(", "),
            self.streams.channel_capacity,
            self.debug,
            self.environment
        )
    }

    /// Socket address string the HTTP listener binds
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> Result<String> {
    Ok(env::var(key).unwrap_or_else(|_| default.to_owned()))
}

/// Parse comma-separated channel names
fn parse_channels(channels_str: &str) -> Vec<String> {
    channels_str
        .split(',')
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .collect()
}
