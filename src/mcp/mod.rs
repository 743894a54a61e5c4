//! Model Context Protocol (MCP) server implementation
//!
//! JSON-RPC 2.0 over stdio. The dispatcher answers the four protocol
//! operations (list/call tools, list/read resources) against the current
//! registry snapshot and routes the built-in knowledge-base tools to the
//! memory store.

pub mod dispatcher;
pub mod protocol;
pub mod server;

pub use dispatcher::{Dispatcher, TextContent};
pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use server::McpServer;
