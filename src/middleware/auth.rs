// ABOUTME: Authorization gate for request authentication via API keys
// ABOUTME: Resolves X-Api-Key tokens, binds credentials, short-circuits 401/403
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Eventgate Project

//! # Authorization Gate
//!
//! Runs before protected handlers: extracts the `X-Api-Key` header,
//! resolves it against the key store, and binds a [`Credential`] into the
//! request's extensions. When keys are not required every request carries
//! the anonymous credential; when they are, missing keys are rejected with
//! 401 and unknown keys with 403 before any handler logic runs.
//!
//! Deployments with checks beyond token existence (expiry, scopes) inject
//! a [`PostAuthCheck`] instead of wrapping the gate.

use crate::constants::API_KEY_HEADER;
use crate::errors::{AppError, AppResult};
use crate::keys::{fingerprint, ApiKey, KeyStore};
use crate::server::ServerResources;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use http::HeaderMap;
use std::sync::Arc;

/// The identity bound to a request after the gate runs
#[derive(Debug, Clone)]
pub enum Credential {
    /// A resolved API key
    Key(Arc<ApiKey>),
    /// No key enforced for this deployment; grants no elevated trust
    Anonymous,
}

impl Credential {
    /// The resolved key, if any
    #[must_use]
    pub fn api_key(&self) -> Option<&ApiKey> {
        match self {
            Self::Key(key) => Some(key),
            Self::Anonymous => None,
        }
    }

    /// Whether this is the anonymous credential
    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }
}

/// Check run after a key resolves, before the credential binds.
/// The default passes everything.
pub type PostAuthCheck = Arc<dyn Fn(&ApiKey) -> AppResult<()> + Send + Sync>;

/// Authorization gate guarding protected endpoints
#[derive(Clone)]
pub struct AuthGate {
    require_key: bool,
    store: Arc<dyn KeyStore>,
    post_auth: PostAuthCheck,
}

impl AuthGate {
    /// Create a gate over a key store
    #[must_use]
    pub fn new(require_key: bool, store: Arc<dyn KeyStore>) -> Self {
        Self {
            require_key,
            store,
            post_auth: Arc::new(|_| Ok(())),
        }
    }

    /// Replace the post-authorization check
    #[must_use]
    pub fn with_post_auth(mut self, check: PostAuthCheck) -> Self {
        self.post_auth = check;
        self
    }

    /// Resolve the request's credential or reject the request
    ///
    /// # Errors
    ///
    /// Returns 401 when a key is required but absent, and 403 when the
    /// presented token is unknown or the post-authorization check rejects
    /// the key.
    #[tracing::instrument(skip(self, headers), fields(key_fingerprint = tracing::field::Empty))]
    pub async fn authorize(&self, headers: &HeaderMap) -> AppResult<Credential> {
        if !self.require_key {
            return Ok(Credential::Anonymous);
        }

        let token = headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(AppError::unauthorized)?;

        tracing::Span::current().record("key_fingerprint", fingerprint(token));

        let Some(key) = self.store.resolve(token).await else {
            tracing::warn!("API key rejected: unknown token");
            return Err(AppError::forbidden(format!("key {token} doesn't exist")));
        };

        (self.post_auth)(&key)?;
        tracing::debug!(label = %key.label, "API key accepted");
        Ok(Credential::Key(key))
    }
}

/// Middleware binding the credential or rendering the rejection.
/// Rejections pass back through the CORS layer like any other response.
pub async fn auth_middleware(
    State(resources): State<Arc<ServerResources>>,
    mut request: Request,
    next: Next,
) -> Response {
    match resources.auth.authorize(request.headers()).await {
        Ok(credential) => {
            request.extensions_mut().insert(credential);
            next.run(request).await
        }
        Err(error) => resources.errors.render(&error),
    }
}
