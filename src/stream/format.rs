// ABOUTME: Feed format negotiation and per-event frame encoding for streaming sessions
// ABOUTME: Covers event-source blocks, single-shot JSON lines, and heartbeat cadence parsing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Eventgate Project

//! Wire formats for streaming feeds
//!
//! A client picks its framing with the `feed` query parameter and its
//! keep-alive cadence with the `heartbeat` query parameter. Both are
//! parsed leniently: unrecognized values fall back to the defaults
//! rather than failing the request.

use std::time::Duration;

use bytes::Bytes;
use serde_json::Value;

use crate::constants::DEFAULT_HEARTBEAT_SECS;

/// How events are laid out on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedFormat {
    /// `event:` / `data:` blocks; the connection stays open for more events.
    EventSource,
    /// A single JSON line, after which the response ends.
    #[default]
    ChunkedJson,
}

impl FeedFormat {
    /// Parse the `feed` query parameter. Only the exact value
    /// `eventsource` selects the long-lived format; anything else,
    /// including an absent parameter, selects single-shot JSON.
    #[must_use]
    pub fn from_query(feed: Option<&str>) -> Self {
        match feed {
            Some("eventsource") => Self::EventSource,
            _ => Self::ChunkedJson,
        }
    }

    /// The `Content-Type` a response in this format declares.
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::EventSource => "text/event-stream",
            Self::ChunkedJson => "application/json",
        }
    }

    /// Whether the session ends after its first event.
    #[must_use]
    pub const fn is_single_shot(self) -> bool {
        matches!(self, Self::ChunkedJson)
    }

    /// Encode one event as a frame in this format.
    ///
    /// Event-source frames are an `event:` line, a `data:` line, and a
    /// blank line, all CRLF-terminated. JSON frames are the serialized
    /// payload followed by CRLF; the event type is not represented.
    #[must_use]
    pub fn encode_event(self, event: &str, data: &Value) -> Bytes {
        match self {
            Self::EventSource => Bytes::from(format!("event: {event}\r\ndata: {data}\r\n\r\n")),
            Self::ChunkedJson => Bytes::from(format!("{data}\r\n")),
        }
    }
}

/// Keep-alive cadence for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Heartbeat {
    /// No keep-alives are written.
    #[default]
    Disabled,
    /// A keep-alive is written at this period.
    Every(Duration),
}

impl Heartbeat {
    /// Parse the `heartbeat` query parameter.
    ///
    /// `true` (case-insensitive) selects the default period. A positive
    /// integer selects that many seconds. Absent, non-positive, or
    /// unparseable values disable keep-alives.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None => Self::Disabled,
            Some(value) if value.eq_ignore_ascii_case("true") => {
                Self::Every(Duration::from_secs(DEFAULT_HEARTBEAT_SECS))
            }
            Some(value) => match value.parse::<u64>() {
                Ok(secs) if secs > 0 => Self::Every(Duration::from_secs(secs)),
                _ => Self::Disabled,
            },
        }
    }

    /// The configured period, when keep-alives are enabled.
    #[must_use]
    pub const fn period(self) -> Option<Duration> {
        match self {
            Self::Disabled => None,
            Self::Every(period) => Some(period),
        }
    }
}
