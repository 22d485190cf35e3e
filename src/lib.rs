// ABOUTME: Main library entry point for the eventgate streaming gateway
// ABOUTME: Provides API-key gated event-source and chunked-JSON feeds over plain HTTP
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Eventgate Project

// Crate-level attributes:
// - deny(unsafe_code): nothing here needs unsafe; keep it that way
#![deny(unsafe_code)]

//! # Eventgate
//!
//! An authenticated HTTP gateway for long-lived event feeds. Clients
//! subscribe to named channels and receive events as they are
//! published, either as an `event:`/`data:` event-source stream that
//! stays open or as a single JSON line that completes the response.
//!
//! ## Features
//!
//! - **Two feed formats**: long-lived event-source blocks or
//!   single-shot JSON lines, chosen per request
//! - **API key gate**: `X-Api-Key` authorization with an injectable
//!   post-authorization check
//! - **Permissive CORS**: a fixed header table stamped on every
//!   response, with per-request origin echo
//! - **Heartbeats**: optional per-session keep-alive newlines at a
//!   client-chosen cadence
//! - **Uniform errors**: every failure renders the same JSON shape
//!
//! ## Quick Start
//!
//! 1. Mint API keys with the `eventgate-keygen` binary
//! 2. Start the gateway with `eventgate-server`
//! 3. Open a feed: `GET /channels/events/stream?feed=eventsource`
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use eventgate::config::ServerConfig;
//! use eventgate::server::{GatewayServer, ServerResources};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     let resources = Arc::new(ServerResources::from_config(config)?);
//!     GatewayServer::new(resources).run().await
//! }
//! ```

/// Configuration management from environment variables
pub mod config;

/// Shared constants: wire headers, defaults, version
pub mod constants;

/// Unified error taxonomy and the JSON error responder
pub mod errors;

/// API key records, token generation, and the key store seam
pub mod keys;

/// Structured logging setup built on `tracing`
pub mod logging;

/// HTTP middleware: CORS responder and the authorization gate
pub mod middleware;

/// Plain HTTP routes (health, readiness)
pub mod routes;

/// Resource container, router assembly, and the serve loop
pub mod server;

/// Streaming sessions, feed formats, and the event hub
pub mod stream;
