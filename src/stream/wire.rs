// ABOUTME: HTTP/1.1 chunked transfer-coding helpers for streaming response bodies
// ABOUTME: Frames payloads as hex-length-prefixed chunks and appends the last-chunk marker
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Eventgate Project

//! Chunked transfer-coding frames
//!
//! Streaming responses are written without a `Content-Length`, so the
//! body travels as HTTP/1.1 chunks: an uppercase hex length, CRLF, the
//! payload, CRLF. A zero-length chunk followed by a blank line marks
//! the end of the body.

use async_stream::stream;
use bytes::{Bytes, BytesMut};
use futures_util::{pin_mut, Stream, StreamExt};

/// Frame one payload as an HTTP/1.1 chunk: `<hex length>\r\n<data>\r\n`.
#[must_use]
pub fn encode_chunk(data: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(data.len() + 16);
    buf.extend_from_slice(format!("{:X}\r\n", data.len()).as_bytes());
    buf.extend_from_slice(data);
    buf.extend_from_slice(b"\r\n");
    buf.freeze()
}

/// The zero-length chunk that terminates a chunked body.
#[must_use]
pub fn last_chunk() -> Bytes {
    Bytes::from_static(b"0\r\n\r\n")
}

/// Adapt a stream of frames into chunk-framed bytes, ending with the
/// last-chunk marker once the frame stream is exhausted.
///
/// Empty frames are skipped: a zero-length chunk is the terminator, so
/// passing one through would end the body early.
pub fn chunked_frames<S>(frames: S) -> impl Stream<Item = Bytes>
where
    S: Stream<Item = Bytes>,
{
    stream! {
        pin_mut!(frames);
        while let Some(frame) = frames.next().await {
            if frame.is_empty() {
                continue;
            }
            yield encode_chunk(&frame);
        }
        yield last_chunk();
    }
}
