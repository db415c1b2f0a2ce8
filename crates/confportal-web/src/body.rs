//! Streaming response body driving the engine's pull contract.
//!
//! The transport side of the deal: repeatedly ask the engine for up to
//! `TRANSPORT_CHUNK_SIZE` bytes and frame each answer as one body chunk,
//! until the engine reports end-of-stream with a zero-length pull.

use axum::body::Body;
use bytes::Bytes;
use futures::stream;

use confportal_core::{PageSource, PageStream};

/// Upper bound handed to every pull. Small enough to keep latency low on
/// constrained links, large enough to amortize per-chunk framing.
pub const TRANSPORT_CHUNK_SIZE: usize = 1024;

/// Wrap a ready-to-stream engine into an Axum response body.
///
/// The body owns the engine for the duration of the HTTP exchange. When the
/// client disconnects early the stream is dropped mid-way, which drops the
/// engine and releases any scratch-file handle it still holds.
pub fn page_body<S>(stream: PageStream<S>) -> Body
where
    S: PageSource + Send + 'static,
{
    let chunks = stream::unfold(stream, |mut engine| async move {
        let mut dest = vec![0u8; TRANSPORT_CHUNK_SIZE];
        match engine.pull(&mut dest) {
            Ok(0) => None,
            Ok(n) => {
                dest.truncate(n);
                Some((Ok(Bytes::from(dest)), engine))
            }
            Err(err) => {
                // Engine-fatal mid-stream: surface an error frame so the
                // connection closes instead of ending as a seemingly
                // complete document.
                tracing::error!(error = %err, "page stream failed, closing connection");
                Some((Err(std::io::Error::other(err)), engine))
            }
        }
    });
    Body::from_stream(chunks)
}
