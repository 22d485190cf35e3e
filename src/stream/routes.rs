// ABOUTME: HTTP surface for streaming: open a channel feed, publish an event into a channel
// ABOUTME: Stream opens subscribe to the hub and spawn a pump that frames events into the session
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Eventgate Project

//! Streaming routes
//!
//! `GET /channels/{channel}/stream` opens a feed in the format and
//! heartbeat cadence the query string asks for. `POST /channels/{channel}`
//! publishes one event to every open feed on that channel.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use serde_json::json;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::errors::AppResult;
use crate::server::ServerResources;
use crate::stream::format::{FeedFormat, Heartbeat};
use crate::stream::hub::OutboundEvent;
use crate::stream::session::{not_found_response, StreamSession};

/// Streaming routes implementation
pub struct StreamRoutes;

impl StreamRoutes {
    /// Create the streaming surface routes.
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/channels/:channel/stream", get(Self::handle_open_stream))
            .route("/channels/:channel", post(Self::handle_publish))
            .with_state(resources)
    }

    /// Open a streaming feed on one channel.
    #[allow(clippy::unused_async)]
    async fn handle_open_stream(
        State(resources): State<Arc<ServerResources>>,
        Path(channel): Path<String>,
        Query(params): Query<HashMap<String, String>>,
    ) -> Response {
        let Some(receiver) = resources.hub.subscribe(&channel) else {
            debug!(channel = %channel, "Stream requested for unknown channel");
            return not_found_response();
        };

        let format = FeedFormat::from_query(params.get("feed").map(String::as_str));
        let heartbeat = Heartbeat::parse(params.get("heartbeat").map(String::as_str));

        let detach_log = {
            let channel = channel.clone();
            Box::new(move || debug!(channel = %channel, "Stream subscriber detached"))
        };
        let (session, body) = StreamSession::open(format, heartbeat, Some(detach_log));
        debug!(
            channel = %channel,
            session_id = %session.id(),
            "Stream opened"
        );
        tokio::spawn(pump_events(session, receiver, channel));

        (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, format.content_type()),
                (header::CACHE_CONTROL, "no-cache"),
            ],
            body,
        )
            .into_response()
    }

    /// Publish one event into a channel.
    #[allow(clippy::unused_async)]
    async fn handle_publish(
        State(resources): State<Arc<ServerResources>>,
        Path(channel): Path<String>,
        body: Bytes,
    ) -> Response {
        match Self::publish(&resources, &channel, &body) {
            Ok(delivered) => {
                debug!(channel = %channel, delivered, "Event published");
                (StatusCode::OK, Json(json!({"delivered": delivered}))).into_response()
            }
            Err(error) => {
                debug!(channel = %channel, error = %error, "Publish rejected");
                resources.errors.render(&error)
            }
        }
    }

    fn publish(resources: &ServerResources, channel: &str, body: &[u8]) -> AppResult<usize> {
        let event: OutboundEvent = serde_json::from_slice(body)?;
        resources.hub.publish(channel, event)
    }
}

/// Forward channel events into one session until either side ends.
///
/// A lagging subscriber skips the events it lost and keeps reading;
/// the channel vanishing or the client disconnecting both end the
/// pump, and teardown is safe to repeat.
async fn pump_events(
    session: StreamSession,
    mut receiver: broadcast::Receiver<OutboundEvent>,
    channel: String,
) {
    loop {
        match receiver.recv().await {
            Ok(event) => {
                if session.send_event(&event.event, &event.data).is_err() {
                    break;
                }
                if session.is_closed() {
                    // Single-shot feeds end after their first event.
                    break;
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(
                    channel = %channel,
                    skipped,
                    "Stream subscriber lagged; oldest events were dropped"
                );
            }
            Err(RecvError::Closed) => {
                debug!(channel = %channel, "Channel closed; ending stream");
                break;
            }
        }
    }
    session.close();
}
