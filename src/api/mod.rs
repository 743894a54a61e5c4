//! Operator-facing HTTP API
//!
//! Health, metrics snapshot, and raw-YAML configuration management. This is
//! the read/write surface the original served next to the MCP transport;
//! accepted config updates rebuild the registry before the response is sent.

pub mod server;

pub use server::{build_router, ApiServer, ApiServerConfig, AppState};
