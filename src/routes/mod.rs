// ABOUTME: Route module organization for the gateway's plain HTTP endpoints
// ABOUTME: Streaming routes live with the stream module; everything else is organized here
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Eventgate Project

//! Route modules for the gateway
//!
//! Thin handlers only; anything stateful delegates to the shared
//! [`crate::server::ServerResources`].

/// Health check and readiness routes
pub mod health;

pub use health::HealthRoutes;
