// ABOUTME: CORS middleware configuration for HTTP API endpoints
// ABOUTME: Precomputed header table, per-request origin echo, and preflight answering
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright (c) 2025 Eventgate Project

//! Cross-origin access control
//!
//! The header table is fixed at startup and stamped on every response the
//! gateway produces, errors included, which is why this layer sits
//! outermost. The `Allow-Origin` value echoes the request's `Origin`
//! header verbatim; requests without a usable origin get `*`.

use crate::constants::{
    CORS_ALLOW_CREDENTIALS, CORS_ALLOW_HEADERS, CORS_ALLOW_METHODS, CORS_MAX_AGE,
};
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http::header::{
    HeaderName, HeaderValue, ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, ORIGIN,
};
use http::{Method, StatusCode};
use std::sync::Arc;

/// Immutable CORS header table, built once at startup and shared
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    static_headers: Vec<(HeaderName, HeaderValue)>,
    wildcard: HeaderValue,
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl CorsPolicy {
    /// Build the fixed header table
    #[must_use]
    pub fn new() -> Self {
        Self {
            static_headers: vec![
                (
                    ACCESS_CONTROL_ALLOW_METHODS,
                    HeaderValue::from_static(CORS_ALLOW_METHODS),
                ),
                (
                    ACCESS_CONTROL_ALLOW_HEADERS,
                    HeaderValue::from_static(CORS_ALLOW_HEADERS),
                ),
                (
                    ACCESS_CONTROL_MAX_AGE,
                    HeaderValue::from_static(CORS_MAX_AGE),
                ),
                (
                    ACCESS_CONTROL_ALLOW_CREDENTIALS,
                    HeaderValue::from_static(CORS_ALLOW_CREDENTIALS),
                ),
            ],
            wildcard: HeaderValue::from_static("*"),
        }
    }

    /// `Allow-Origin` value for a request
    ///
    /// Echoes the presented `Origin` verbatim. An absent header, or the
    /// literal string `null` browsers send for opaque origins, yields `*`.
    #[must_use]
    pub fn allow_origin(&self, origin: Option<&HeaderValue>) -> HeaderValue {
        match origin {
            Some(value) if value.as_bytes() != b"null" => value.clone(),
            _ => self.wildcard.clone(),
        }
    }

    /// Stamp the full header set onto a response
    pub fn apply(&self, origin: Option<&HeaderValue>, response: &mut Response) {
        let headers = response.headers_mut();
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, self.allow_origin(origin));
        for (name, value) in &self.static_headers {
            headers.insert(name.clone(), value.clone());
        }
    }
}

/// Outermost middleware: answers preflights and stamps CORS headers on
/// every response, success or error
pub async fn cors_middleware(
    State(policy): State<Arc<CorsPolicy>>,
    request: Request,
    next: Next,
) -> Response {
    let origin = request.headers().get(ORIGIN).cloned();

    let mut response = if request.method() == Method::OPTIONS {
        // Preflights are answered here; no handler runs and no body is sent
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    policy.apply(origin.as_ref(), &mut response);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_allow_origin_echoes_verbatim() {
        let policy = CorsPolicy::new();
        let origin = HeaderValue::from_static("https://app.example.com");
        assert_eq!(policy.allow_origin(Some(&origin)), origin);
    }

    #[test]
    fn test_allow_origin_wildcard_for_absent_and_null() {
        let policy = CorsPolicy::new();
        assert_eq!(policy.allow_origin(None), "*");

        let null_origin = HeaderValue::from_static("null");
        assert_eq!(policy.allow_origin(Some(&null_origin)), "*");
    }

    #[test]
    fn test_apply_stamps_full_table() {
        let policy = CorsPolicy::new();
        let mut response = Response::new(Body::empty());
        policy.apply(None, &mut response);

        let headers = response.headers();
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(
            headers[ACCESS_CONTROL_ALLOW_METHODS],
            "POST, GET, PUT, DELETE, OPTIONS"
        );
        assert_eq!(
            headers[ACCESS_CONTROL_ALLOW_HEADERS],
            "X-Requested-With, X-HTTP-Method-Override, Content-Type, Accept, Authorization"
        );
        assert_eq!(headers[ACCESS_CONTROL_MAX_AGE], "86400");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    }
}
