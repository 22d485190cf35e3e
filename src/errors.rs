// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Unified Error Handling System
//!
//! This module provides the centralized error handling for the gateway.
//! It defines the error taxonomy, the mapping to HTTP statuses, and the
//! JSON error body every failing request renders, so clients see one
//! stable shape regardless of which layer failed.
//!
//! The wire shape is `{"error": <status>, "reason": <string>}`, with an
//! `exc_info` array of the error's cause chain appended in debug mode.

use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use serde_json::{json, Value};
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Standard error codes used throughout the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Authentication is required but no credential was presented
    AuthRequired,
    /// A credential was presented but does not grant access
    PermissionDenied,
    /// The request payload or parameters are malformed
    InvalidInput,
    /// The requested resource does not exist
    ResourceNotFound,
    /// The server configuration is unusable
    ConfigError,
    /// An unexpected internal failure
    InternalError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(self) -> StatusCode {
        match self {
            Self::AuthRequired => StatusCode::UNAUTHORIZED,
            Self::PermissionDenied => StatusCode::FORBIDDEN,
            Self::InvalidInput => StatusCode::BAD_REQUEST,
            Self::ResourceNotFound => StatusCode::NOT_FOUND,
            Self::ConfigError | Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Unified error type for the application
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    /// The error and its causes, outermost first, one line each
    #[must_use]
    pub fn chain(&self) -> Vec<String> {
        let mut lines = vec![self.message.clone()];
        let mut cause = self.source.as_deref().map(|s| s as &dyn StdError);
        while let Some(err) = cause {
            lines.push(err.to_string());
            cause = err.source();
        }
        lines
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// Convenience functions for creating common errors
impl AppError {
    /// Authentication required
    #[must_use]
    pub fn unauthorized() -> Self {
        Self::new(ErrorCode::AuthRequired, "Authentication required")
    }

    /// Access denied
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PermissionDenied, message)
    }

    /// Resource not found
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// Invalid input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::invalid_input("invalid JSON payload").with_source(error)
    }
}

/// Render the wire-level error body for a status code.
///
/// The reason string is stable for the statuses clients branch on
/// (`not_found`, `unauthorized`, `forbidden`); every other status carries
/// its standard reason phrase. `exc_info` is only attached when `debug`
/// is set and the chain is non-empty.
#[must_use]
pub fn error_body(status: StatusCode, debug: bool, exc_info: Option<&[String]>) -> Value {
    let reason = match status {
        StatusCode::NOT_FOUND => "not_found",
        StatusCode::UNAUTHORIZED => "unauthorized",
        StatusCode::FORBIDDEN => "forbidden",
        other => other.canonical_reason().unwrap_or("Unknown"),
    };

    let mut body = json!({
        "error": status.as_u16(),
        "reason": reason,
    });
    if debug {
        if let Some(chain) = exc_info.filter(|chain| !chain.is_empty()) {
            body["exc_info"] = json!(chain);
        }
    }
    body
}

/// Turns `AppError`s into complete JSON responses.
///
/// Every error this crate sends to a client goes through here, so the
/// debug flag is honored on all paths and the body is always JSON.
#[derive(Debug, Clone, Copy)]
pub struct ErrorResponder {
    debug: bool,
}

impl ErrorResponder {
    /// Create a responder; `debug` controls `exc_info` exposure
    #[must_use]
    pub const fn new(debug: bool) -> Self {
        Self { debug }
    }

    /// Whether diagnostic chains are included in bodies
    #[must_use]
    pub const fn debug(&self) -> bool {
        self.debug
    }

    /// Render an error as a JSON response with its mapped status
    #[must_use]
    pub fn render(&self, error: &AppError) -> Response {
        let status = error.http_status();
        let chain = error.chain();
        let body = error_body(status, self.debug, Some(&chain));
        (status, Json(body)).into_response()
    }
}
