// ABOUTME: Named broadcast channels connecting event publishers to streaming sessions
// ABOUTME: Publishing fans an event out to every subscribed session; lagging readers skip, not block
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Eventgate Project

//! Event hub
//!
//! Channels are registered up front from configuration. Publishing to
//! a channel fans the event out to every live subscriber; subscribers
//! that fall behind the channel capacity lose the oldest events rather
//! than slowing the publisher down.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;

use crate::errors::{AppError, AppResult};

fn default_event_type() -> String {
    "message".to_owned()
}

/// One event published to a channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundEvent {
    /// Event type label; carried on the `event:` line of event-source
    /// feeds and absent from single-shot JSON feeds.
    #[serde(default = "default_event_type")]
    pub event: String,
    /// Arbitrary JSON payload.
    pub data: Value,
}

impl OutboundEvent {
    /// Build an event with an explicit type label.
    #[must_use]
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }
}

/// Registry of named broadcast channels.
pub struct EventHub {
    channels: DashMap<String, broadcast::Sender<OutboundEvent>>,
    capacity: usize,
}

impl EventHub {
    /// Create a hub whose channels each buffer `capacity` events per
    /// subscriber before lagging kicks in.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: DashMap::new(),
            capacity,
        }
    }

    /// Register a channel. Registering an existing name is a no-op, so
    /// current subscribers keep their subscriptions.
    pub fn register(&self, name: impl Into<String>) {
        let name = name.into();
        self.channels
            .entry(name.clone())
            .or_insert_with(|| broadcast::channel(self.capacity).0);
        tracing::debug!(channel = %name, "Channel registered");
    }

    /// Whether a channel with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.channels.contains_key(name)
    }

    /// Subscribe to a channel, receiving every event published after
    /// this call. Returns `None` for unknown channels.
    #[must_use]
    pub fn subscribe(&self, name: &str) -> Option<broadcast::Receiver<OutboundEvent>> {
        self.channels.get(name).map(|sender| sender.subscribe())
    }

    /// Publish an event, returning how many subscribers received it.
    /// A channel with no subscribers delivers to zero and is not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns a not-found error when the channel was never registered.
    pub fn publish(&self, name: &str, event: OutboundEvent) -> AppResult<usize> {
        let sender = self
            .channels
            .get(name)
            .ok_or_else(|| AppError::not_found(format!("channel {name}")))?;
        Ok(sender.send(event).unwrap_or(0))
    }

    /// Registered channel names, sorted for stable display.
    #[must_use]
    pub fn channel_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .channels
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }
}
