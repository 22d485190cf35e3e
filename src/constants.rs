// ABOUTME: Wire-level protocol constants shared across the gateway
// ABOUTME: CORS header values, auth header name, and streaming defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Eventgate Project

//! Protocol constants
//!
//! Fixed wire-level values the gateway promises to clients. The CORS
//! table is part of the public contract and changes here are breaking.

/// Server version from Cargo.toml
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Methods advertised on preflight responses
pub const CORS_ALLOW_METHODS: &str = "POST, GET, PUT, DELETE, OPTIONS";

/// Request headers advertised on preflight responses
pub const CORS_ALLOW_HEADERS: &str =
    "X-Requested-With, X-HTTP-Method-Override, Content-Type, Accept, Authorization";

/// How long browsers may cache preflight results, in seconds
pub const CORS_MAX_AGE: &str = "86400";

/// Whether cross-origin requests may carry credentials
pub const CORS_ALLOW_CREDENTIALS: &str = "true";

/// Header carrying the client's API key token
pub const API_KEY_HEADER: &str = "x-api-key";

/// Heartbeat period when a client asks for heartbeats without a value
pub const DEFAULT_HEARTBEAT_SECS: u64 = 60;

/// Channel registered when no channel list is configured
pub const DEFAULT_CHANNEL: &str = "events";

/// Broadcast buffer depth per channel before slow subscribers lag
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Prefix identifying tokens minted by this gateway
pub const TOKEN_PREFIX: &str = "egk_";
