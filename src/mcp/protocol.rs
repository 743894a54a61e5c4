//! JSON-RPC 2.0 wire types
//!
//! The protocol surface is deliberately small: requests in, one response
//! out, standard error codes plus an application range for tool failures.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Standard JSON-RPC error codes
pub mod codes {
    /// Request was not valid JSON
    pub const PARSE_ERROR: i32 = -32700;
    /// Request envelope was malformed
    pub const INVALID_REQUEST: i32 = -32600;
    /// Unknown method
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Parameters did not match the method
    pub const INVALID_PARAMS: i32 = -32602;
    /// Server-side failure
    pub const INTERNAL_ERROR: i32 = -32603;
    /// Application-level failure (tool/resource lookup misses)
    pub const APPLICATION_ERROR: i32 = -32000;
}

/// JSON-RPC 2.0 request envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol version, must be "2.0"
    pub jsonrpc: String,

    /// Method name
    pub method: String,

    /// Method parameters
    #[serde(default)]
    pub params: Value,

    /// Request id; absent for notifications
    pub id: Option<Value>,
}

/// JSON-RPC 2.0 response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Protocol version, always "2.0"
    pub jsonrpc: String,

    /// Present on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Present on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,

    /// Echoed request id
    pub id: Option<Value>,
}

impl JsonRpcResponse {
    /// Success response carrying `result`
    pub fn ok(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    /// Error response carrying `error`
    pub fn err(id: Option<Value>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id,
        }
    }
}

/// JSON-RPC 2.0 error object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code
    pub code: i32,

    /// Human-readable message
    pub message: String,
}

impl JsonRpcError {
    /// Build an error with one of the [`codes`]
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Unknown method error
    pub fn method_not_found(method: &str) -> Self {
        Self::new(codes::METHOD_NOT_FOUND, format!("Method not found: {method}"))
    }
}
