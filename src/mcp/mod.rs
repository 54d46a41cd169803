//! Model Context Protocol server handling and JSON-RPC implementations
//!
//! Provides the JSON-RPC envelope types and the method dispatcher.

pub mod rpc;
pub mod server;
