//! HTTP transport layer for the Model Context Protocol
//!
//! Provides the external routes: the `/sse` session stream, the `/messages`
//! JSON-RPC listener, and the CORS and fallback handling around them.

pub mod cors;
pub mod handlers;
