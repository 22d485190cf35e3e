// ABOUTME: Health check route handlers for service monitoring and load balancers
// ABOUTME: Liveness is stateless; readiness reports the configured channels and gate mode
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Eventgate Project

//! Health check routes
//!
//! `/health` answers liveness probes with a constant shape. `/ready`
//! additionally reports what the gateway was configured to serve.
//! Neither sits behind the authorization gate, but both pass through
//! the CORS layer like every other response.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::constants::SERVER_VERSION;
use crate::server::ServerResources;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create the health check routes.
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/health", get(Self::handle_health))
            .route("/ready", get(Self::handle_ready))
            .with_state(resources)
    }

    #[allow(clippy::unused_async)]
    async fn handle_health() -> Json<Value> {
        Json(json!({
            "status": "healthy",
            "timestamp": chrono::Utc::now().to_rfc3339()
        }))
    }

    #[allow(clippy::unused_async)]
    async fn handle_ready(State(resources): State<Arc<ServerResources>>) -> Json<Value> {
        Json(json!({
            "status": "ready",
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "version": SERVER_VERSION,
            "channels": resources.hub.channel_names(),
            "require_api_key": resources.config.auth.require_key
        }))
    }
}
