// ABOUTME: Configuration management module for centralized server settings
// ABOUTME: Handles environment variables, validation, and runtime configuration parsing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Eventgate Project

//! Configuration module for the gateway
//!
//! Configuration is environment-only: every setting has an `EVENTGATE_*`
//! variable and a default, and the loaded config is validated before the
//! server binds.

/// Environment and server configuration
pub mod environment;

pub use environment::{AuthConfig, Environment, ServerConfig, StreamConfig};
