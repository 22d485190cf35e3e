// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Streaming Sessions
//!
//! A [`StreamSession`] is the server side of one long-lived streaming
//! response. Opening a session yields the session handle plus the
//! response [`Body`] the client reads from; events written through the
//! handle are framed per the session's [`FeedFormat`] and flow out as
//! body bytes.
//!
//! Teardown is idempotent no matter how many times or from how many
//! tasks it is triggered: the first close wins, runs the cleanup hook
//! exactly once, stops the heartbeat timer, and ends the body. The
//! heartbeat task holds only a [`Weak`] reference, so an abandoned
//! session can never be kept alive by its own keep-alive timer.

use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use futures_util::StreamExt;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_stream::wrappers::UnboundedReceiverStream;
use uuid::Uuid;

use crate::stream::format::{FeedFormat, Heartbeat};

/// Returned by writes once the session is torn down or the client is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("streaming session closed")]
pub struct SessionClosed;

/// Hook invoked exactly once when a session ends, however it ends.
///
/// Sessions use this to detach from whatever feeds them, typically by
/// logging and letting the dropped subscription unregister itself.
pub type CleanupHook = Box<dyn FnOnce() + Send>;

struct SessionInner {
    id: Uuid,
    format: FeedFormat,
    closed: AtomicBool,
    /// Dropping the sender is what ends the response body, so it lives
    /// behind an `Option` that teardown takes.
    frames: Mutex<Option<mpsc::UnboundedSender<Bytes>>>,
    cleanup: Mutex<Option<CleanupHook>>,
    heartbeat: Mutex<Option<JoinHandle<()>>>,
}

impl SessionInner {
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Queue one frame for the client. A send failure means the body
    /// stream is gone, which tears the session down.
    fn send_frame(&self, frame: Bytes) -> Result<(), SessionClosed> {
        if self.is_closed() {
            return Err(SessionClosed);
        }
        let delivered = {
            let guard = self.frames.lock().ok();
            match guard.as_ref().and_then(|slot| slot.as_ref()) {
                Some(sender) => sender.send(frame).is_ok(),
                None => false,
            }
        };
        if delivered {
            Ok(())
        } else {
            self.close();
            Err(SessionClosed)
        }
    }

    /// Idempotent teardown: the first caller flips the closed flag,
    /// ends the body, runs the cleanup hook, and stops the heartbeat.
    /// Every later caller returns immediately.
    fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Ok(mut slot) = self.frames.lock() {
            slot.take();
        }
        let hook = self.cleanup.lock().ok().and_then(|mut slot| slot.take());
        if let Some(hook) = hook {
            hook();
        }
        let task = self.heartbeat.lock().ok().and_then(|mut slot| slot.take());
        if let Some(task) = task {
            task.abort();
        }
        tracing::debug!(session_id = %self.id, "Streaming session closed");
    }
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        // Last owner went away without an explicit close, e.g. the
        // pumping task was aborted. The hook still runs exactly once.
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(hook) = self.cleanup.get_mut().ok().and_then(Option::take) {
            hook();
        }
        if let Some(task) = self.heartbeat.get_mut().ok().and_then(Option::take) {
            task.abort();
        }
    }
}

/// Handle to one open streaming response.
///
/// Clone-free by design: the task that pumps events owns the handle,
/// and everything else observes the session only through the weak
/// heartbeat reference or the body stream.
pub struct StreamSession {
    inner: Arc<SessionInner>,
}

impl StreamSession {
    /// Open a session and build the response body its client will read.
    ///
    /// When `heartbeat` is enabled, a background task writes a single
    /// newline at each period. The task holds a weak reference and
    /// exits on its own once the session closes or is dropped.
    #[must_use]
    pub fn open(
        format: FeedFormat,
        heartbeat: Heartbeat,
        cleanup: Option<CleanupHook>,
    ) -> (Self, Body) {
        let (tx, rx) = mpsc::unbounded_channel::<Bytes>();
        let inner = Arc::new(SessionInner {
            id: Uuid::new_v4(),
            format,
            closed: AtomicBool::new(false),
            frames: Mutex::new(Some(tx)),
            cleanup: Mutex::new(cleanup),
            heartbeat: Mutex::new(None),
        });

        if let Some(period) = heartbeat.period() {
            let task = tokio::spawn(run_heartbeat(Arc::downgrade(&inner), period));
            if let Ok(mut slot) = inner.heartbeat.lock() {
                *slot = Some(task);
            }
        }

        tracing::debug!(
            session_id = %inner.id,
            format = ?format,
            heartbeat = ?heartbeat,
            "Streaming session opened"
        );

        let body = Body::from_stream(UnboundedReceiverStream::new(rx).map(Ok::<_, Infallible>));
        (Self { inner }, body)
    }

    /// Identifier used to correlate log lines for this session.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// The framing this session writes.
    #[must_use]
    pub fn format(&self) -> FeedFormat {
        self.inner.format
    }

    /// Whether teardown has already happened.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    /// Write one event to the client.
    ///
    /// Single-shot formats close the session right after the frame is
    /// queued, so the response terminates once it drains.
    ///
    /// # Errors
    ///
    /// Returns [`SessionClosed`] when the session was already torn down
    /// or the client has disconnected.
    pub fn send_event(&self, event: &str, data: &Value) -> Result<(), SessionClosed> {
        let frame = self.inner.format.encode_event(event, data);
        self.inner.send_frame(frame)?;
        if self.inner.format.is_single_shot() {
            self.inner.close();
        }
        Ok(())
    }

    /// Tear the session down. Safe to call any number of times.
    pub fn close(&self) {
        self.inner.close();
    }
}

/// Keep-alive loop: one newline per period, until the session closes
/// or the client disconnects. Holds only a weak reference so it never
/// extends the session's lifetime.
async fn run_heartbeat(session: Weak<SessionInner>, period: Duration) {
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately; consume it so the first
    // beat lands a full period after the session opens.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let Some(inner) = session.upgrade() else {
            break;
        };
        if inner.send_frame(Bytes::from_static(b"\n")).is_err() {
            break;
        }
    }
}

/// The 404 a stream request gets when its channel does not exist.
///
/// This is the streaming surface's own short body, distinct from the
/// numeric-code envelope general API errors render.
#[must_use]
pub fn not_found_response() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({"error": "not_found"}))).into_response()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use std::sync::atomic::AtomicUsize;

    use super::*;

    fn counting_hook(counter: &Arc<AtomicUsize>) -> CleanupHook {
        let counter = Arc::clone(counter);
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    async fn next_frame(body: &mut axum::body::BodyDataStream) -> Option<Bytes> {
        time::timeout(Duration::from_secs(2), body.next())
            .await
            .expect("timed out waiting for a frame")
            .map(|result| result.expect("body stream errored"))
    }

    #[tokio::test]
    async fn eventsource_session_stays_open_across_events() {
        let (session, body) =
            StreamSession::open(FeedFormat::EventSource, Heartbeat::Disabled, None);
        let mut frames = body.into_data_stream();

        session.send_event("state", &json!({"seq": 1})).unwrap();
        session.send_event("state", &json!({"seq": 2})).unwrap();

        assert_eq!(
            next_frame(&mut frames).await.unwrap().as_ref(),
            b"event: state\r\ndata: {\"seq\":1}\r\n\r\n"
        );
        assert_eq!(
            next_frame(&mut frames).await.unwrap().as_ref(),
            b"event: state\r\ndata: {\"seq\":2}\r\n\r\n"
        );
        assert!(!session.is_closed());
    }

    #[tokio::test]
    async fn single_shot_session_closes_after_first_event() {
        let (session, body) =
            StreamSession::open(FeedFormat::ChunkedJson, Heartbeat::Disabled, None);
        let mut frames = body.into_data_stream();

        session.send_event("state", &json!({"done": true})).unwrap();
        assert!(session.is_closed());
        assert_eq!(
            session.send_event("state", &json!({"done": true})),
            Err(SessionClosed)
        );

        assert_eq!(
            next_frame(&mut frames).await.unwrap().as_ref(),
            b"{\"done\":true}\r\n"
        );
        // Sender was dropped by the close, so the body ends.
        assert!(next_frame(&mut frames).await.is_none());
    }

    #[tokio::test]
    async fn cleanup_hook_runs_exactly_once() {
        let counter = Arc::new(AtomicUsize::new(0));
        let (session, body) = StreamSession::open(
            FeedFormat::EventSource,
            Heartbeat::Disabled,
            Some(counting_hook(&counter)),
        );

        session.close();
        session.close();
        drop(session);
        drop(body);

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn dropping_an_unclosed_session_still_runs_the_hook() {
        let counter = Arc::new(AtomicUsize::new(0));
        let (session, body) = StreamSession::open(
            FeedFormat::EventSource,
            Heartbeat::Disabled,
            Some(counting_hook(&counter)),
        );

        drop(body);
        drop(session);

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn heartbeat_writes_single_newlines() {
        let (session, body) = StreamSession::open(
            FeedFormat::EventSource,
            Heartbeat::Every(Duration::from_millis(10)),
            None,
        );
        let mut frames = body.into_data_stream();

        assert_eq!(next_frame(&mut frames).await.unwrap().as_ref(), b"\n");
        assert_eq!(next_frame(&mut frames).await.unwrap().as_ref(), b"\n");
        drop(session);
    }

    #[tokio::test]
    async fn close_stops_the_heartbeat_and_ends_the_body() {
        let (session, body) = StreamSession::open(
            FeedFormat::EventSource,
            Heartbeat::Every(Duration::from_millis(10)),
            None,
        );
        let mut frames = body.into_data_stream();

        assert_eq!(next_frame(&mut frames).await.unwrap().as_ref(), b"\n");
        session.close();

        // Drain whatever beats were already queued; the stream must end
        // rather than keep producing.
        while let Some(frame) = next_frame(&mut frames).await {
            assert_eq!(frame.as_ref(), b"\n");
        }
    }

    #[tokio::test]
    async fn send_after_client_disconnect_fails_and_closes() {
        let (session, body) =
            StreamSession::open(FeedFormat::EventSource, Heartbeat::Disabled, None);
        drop(body);

        assert_eq!(session.send_event("state", &json!({})), Err(SessionClosed));
        assert!(session.is_closed());
    }

    #[tokio::test]
    async fn not_found_body_uses_the_short_shape() {
        let response = not_found_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value, json!({"error": "not_found"}));
    }
}
