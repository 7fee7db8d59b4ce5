//! Wire-level primitives for the legacy SSE transport.
//!
//! The stream is a long-lived HTTP GET carrying line-delimited frames:
//! `event:` lines name the frame, `data:` lines accumulate its payload,
//! and a blank line flushes it. Two frame types matter to the client:
//! `endpoint` (the callback URL for POSTing calls) and `message` (a
//! JSON-RPC reply correlated by id).

pub mod sse;

pub const EVENT_STREAM_CONTENT_TYPE: &str = "text/event-stream";

/// Frame carrying the per-session callback URL, sent once at stream start.
pub const ENDPOINT_EVENT: &str = "endpoint";
/// Frame carrying an asynchronous JSON-RPC reply.
pub const MESSAGE_EVENT: &str = "message";

/// Returns true when a response content type denotes an event stream,
/// ignoring parameters and case.
pub fn is_event_stream_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(str::trim)
        .is_some_and(|value| value.eq_ignore_ascii_case(EVENT_STREAM_CONTENT_TYPE))
}
