// ABOUTME: Shared resource container, router assembly, and the serve loop
// ABOUTME: Wires CORS, authorization, streaming, and health routes into one HTTP server
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright (c) 2025 Eventgate Project

//! # Gateway Server
//!
//! [`ServerResources`] is the dependency-injection container built once
//! at startup and shared as an `Arc` by every handler and middleware.
//! [`GatewayServer`] assembles the router around it and runs the serve
//! loop until a shutdown signal arrives.
//!
//! Middleware order matters: CORS sits outermost so its headers land on
//! every response, including authorization failures, and so preflight
//! requests are answered before authorization ever runs.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::middleware::from_fn_with_state;
use axum::response::Response;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::errors::{AppError, AppResult, ErrorResponder};
use crate::keys::{KeyStore, MemoryKeyStore};
use crate::middleware::{auth_middleware, cors_middleware, AuthGate, CorsPolicy};
use crate::routes::HealthRoutes;
use crate::stream::{EventHub, StreamRoutes};

/// Centralized resource container for dependency injection
///
/// Holds everything request handling needs so routes and middleware
/// share one set of resources instead of rebuilding them per request.
#[derive(Clone)]
pub struct ServerResources {
    /// Server configuration loaded at startup
    pub config: Arc<ServerConfig>,
    /// API key store backing the authorization gate
    pub keys: Arc<MemoryKeyStore>,
    /// Named event channels feeding the streaming sessions
    pub hub: Arc<EventHub>,
    /// Authorization gate applied to protected routes
    pub auth: Arc<AuthGate>,
    /// Renders every error body in the uniform JSON shape
    pub errors: ErrorResponder,
}

impl ServerResources {
    /// Assemble resources from already-built parts.
    #[must_use]
    pub fn new(
        config: Arc<ServerConfig>,
        keys: Arc<MemoryKeyStore>,
        hub: Arc<EventHub>,
        auth: Arc<AuthGate>,
    ) -> Self {
        let errors = ErrorResponder::new(config.debug);
        Self {
            config,
            keys,
            hub,
            auth,
            errors,
        }
    }

    /// Build the full resource set from configuration: load the key
    /// store, register the configured channels, and wire the gate.
    ///
    /// # Errors
    ///
    /// Returns an error when the key file cannot be read or parsed.
    pub fn from_config(config: ServerConfig) -> AppResult<Self> {
        let keys = Arc::new(MemoryKeyStore::new());
        if let Some(path) = &config.auth.keys_file {
            let loaded = keys.load_file(path)?;
            if config.auth.require_key && loaded == 0 {
                warn!(
                    file = %path.display(),
                    "API keys are required but the key file provided none; all requests will be rejected"
                );
            }
        }

        let hub = Arc::new(EventHub::new(config.streams.channel_capacity));
        for channel in &config.streams.channels {
            hub.register(channel.clone());
        }

        let auth = Arc::new(AuthGate::new(
            config.auth.require_key,
            Arc::clone(&keys) as Arc<dyn KeyStore>,
        ));

        Ok(Self::new(Arc::new(config), keys, hub, auth))
    }
}

/// The HTTP gateway: router assembly plus the serve loop.
pub struct GatewayServer {
    resources: Arc<ServerResources>,
}

impl GatewayServer {
    /// Create a server around shared resources.
    #[must_use]
    pub const fn new(resources: Arc<ServerResources>) -> Self {
        Self { resources }
    }

    /// Resources this server was built around.
    #[must_use]
    pub fn resources(&self) -> &Arc<ServerResources> {
        &self.resources
    }

    /// Build the complete router.
    ///
    /// Streaming routes sit behind the authorization gate; health does
    /// not. CORS is layered outermost so its headers reach every
    /// response and `OPTIONS` preflights short-circuit before
    /// authorization.
    #[must_use]
    pub fn build_router(resources: &Arc<ServerResources>) -> Router {
        let protected = StreamRoutes::routes(Arc::clone(resources)).layer(from_fn_with_state(
            Arc::clone(resources),
            auth_middleware,
        ));

        let fallback_resources = Arc::clone(resources);
        Router::new()
            .merge(protected)
            .merge(HealthRoutes::routes(Arc::clone(resources)))
            .fallback(move || {
                let resources = Arc::clone(&fallback_resources);
                async move {
                    let error = AppError::not_found("route");
                    let response: Response = resources.errors.render(&error);
                    response
                }
            })
            .layer(TraceLayer::new_for_http())
            .layer(from_fn_with_state(
                Arc::new(CorsPolicy::new()),
                cors_middleware,
            ))
    }

    /// Bind and serve until a shutdown signal arrives.
    ///
    /// # Errors
    ///
    /// Returns an error when the listener cannot bind or the serve
    /// loop fails.
    pub async fn run(self) -> Result<()> {
        let addr = self.resources.config.bind_addr();
        let router = Self::build_router(&self.resources);

        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;

        info!(
            address = %addr,
            channels = ?self.resources.hub.channel_names(),
            require_api_key = self.resources.config.auth.require_key,
            "Gateway listening"
        );
        Self::display_endpoints(&self.resources);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP server error")?;

        info!("Gateway stopped");
        Ok(())
    }

    /// Log the available endpoints with their bind address.
    fn display_endpoints(resources: &Arc<ServerResources>) {
        let addr = resources.config.bind_addr();
        info!("=== Available Endpoints ===");
        for channel in resources.hub.channel_names() {
            info!("   Stream:  GET  http://{addr}/channels/{channel}/stream");
            info!("   Publish: POST http://{addr}/channels/{channel}");
        }
        info!("   Health:  GET  http://{addr}/health");
        info!("=== End of Endpoint List ===");
    }
}

/// Resolves when the process receives ctrl-c or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(%error, "Failed to install ctrl-c handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => warn!(%error, "Failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received ctrl-c; shutting down"),
        () = terminate => info!("Received SIGTERM; shutting down"),
    }
}
