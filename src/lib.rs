//! mcpget invokes tools on remote MCP servers that speak the legacy SSE
//! transport, directly over HTTP and without a model in the loop.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core::config`] loads the mcp.json server registry and owns the
//!   immutable per-server session data (URL, static headers, transport).
//! - [`mcp::transport`] provides the wire-level SSE primitives: the
//!   chunk-agnostic line buffer, the event-frame parser, and callback
//!   endpoint resolution.
//! - [`mcp::client`] drives the dual-channel call flow: it opens the
//!   streaming connection, runs the background listener, and correlates
//!   asynchronous replies back to the call that triggered them.
//! - [`cli`] parses command-line arguments and renders results.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`cli::run`].

pub mod cli;
pub mod core;
pub mod mcp;
