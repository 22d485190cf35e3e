// ABOUTME: Streaming transport for long-lived HTTP feeds over named event channels
// ABOUTME: Sessions frame hub events as event-source blocks or single-shot JSON lines
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright (c) 2025 Eventgate Project

/// Feed format selection and per-event frame encoding
pub mod format;
/// Named broadcast channels connecting publishers to sessions
pub mod hub;
/// HTTP route handlers for opening feeds and publishing events
pub mod routes;
/// Session lifecycle: open, write, heartbeat, idempotent teardown
pub mod session;
/// Chunked transfer-coding helpers for streaming bodies
pub mod wire;

pub use format::{FeedFormat, Heartbeat};
pub use hub::{EventHub, OutboundEvent};
pub use routes::StreamRoutes;
pub use session::{not_found_response, CleanupHook, SessionClosed, StreamSession};
