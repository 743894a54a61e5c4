//! MCP server with stdio transport
//!
//! Reads line-delimited JSON-RPC requests from stdin and writes one
//! response per request to stdout. Routing covers initialize, the tool
//! operations, and the resource operations; lookup misses become
//! application errors, execution failures are already content by the time
//! the dispatcher returns.

use super::dispatcher::Dispatcher;
use super::protocol::{codes, JsonRpcError, JsonRpcRequest, JsonRpcResponse};
use crate::error::{ProteusError, Result};
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info};

/// MCP server that handles JSON-RPC requests over stdio
pub struct McpServer {
    dispatcher: Arc<Dispatcher>,
    server_name: String,
    server_version: String,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(dispatcher: Arc<Dispatcher>, server_name: String, server_version: String) -> Self {
        Self {
            dispatcher,
            server_name,
            server_version,
        }
    }

    /// Run the server until stdin closes
    pub async fn run(&self) -> Result<()> {
        info!("MCP server started, listening on stdin");

        let stdin = tokio::io::stdin();
        let mut reader = BufReader::new(stdin);
        let mut stdout = tokio::io::stdout();
        let mut line = String::new();

        loop {
            line.clear();
            match reader.read_line(&mut line).await {
                Ok(0) => {
                    debug!("Received EOF, shutting down");
                    break;
                }
                Ok(_) => {
                    let request = line.trim();
                    if request.is_empty() {
                        continue;
                    }

                    let response = self.process_request(request).await;
                    let wire = serde_json::to_string(&response)?;

                    stdout.write_all(wire.as_bytes()).await?;
                    stdout.write_all(b"\n").await?;
                    stdout.flush().await?;
                }
                Err(e) => {
                    error!("Failed to read from stdin: {}", e);
                    break;
                }
            }
        }

        info!("MCP server shutting down");
        Ok(())
    }

    /// Process a single JSON-RPC request line
    pub async fn process_request(&self, line: &str) -> JsonRpcResponse {
        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(e) => {
                return JsonRpcResponse::err(
                    None,
                    JsonRpcError::new(codes::PARSE_ERROR, format!("Invalid JSON: {e}")),
                );
            }
        };

        if request.jsonrpc != "2.0" {
            return JsonRpcResponse::err(
                request.id,
                JsonRpcError::new(codes::INVALID_REQUEST, "jsonrpc must be '2.0'"),
            );
        }

        debug!("Handling {}", request.method);
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request),
            "tools/list" => self.handle_tools_list(request),
            "tools/call" => self.handle_tools_call(request).await,
            "resources/list" => self.handle_resources_list(request),
            "resources/read" => self.handle_resources_read(request).await,
            _ => JsonRpcResponse::err(request.id, JsonRpcError::method_not_found(&request.method)),
        }
    }

    fn handle_initialize(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        JsonRpcResponse::ok(
            request.id,
            serde_json::json!({
                "protocolVersion": "2024-11-05",
                "serverInfo": {
                    "name": self.server_name,
                    "version": self.server_version
                },
                "capabilities": {
                    "tools": {},
                    "resources": {}
                }
            }),
        )
    }

    fn handle_tools_list(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let tools = self.dispatcher.list_tools();
        JsonRpcResponse::ok(request.id, serde_json::json!({ "tools": tools }))
    }

    async fn handle_tools_call(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let (name, arguments) = match parse_call_params(&request.params) {
            Ok(parsed) => parsed,
            Err(e) => {
                return JsonRpcResponse::err(
                    request.id,
                    JsonRpcError::new(codes::INVALID_PARAMS, e.to_string()),
                );
            }
        };

        match self.dispatcher.call_tool(&name, arguments).await {
            Ok(content) => {
                JsonRpcResponse::ok(request.id, serde_json::json!({ "content": content }))
            }
            Err(e) => JsonRpcResponse::err(
                request.id,
                JsonRpcError::new(codes::APPLICATION_ERROR, e.to_string()),
            ),
        }
    }

    fn handle_resources_list(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let resources = self.dispatcher.list_resources();
        JsonRpcResponse::ok(request.id, serde_json::json!({ "resources": resources }))
    }

    async fn handle_resources_read(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let uri = match request.params.get("uri").and_then(Value::as_str) {
            Some(uri) => uri.to_string(),
            None => {
                return JsonRpcResponse::err(
                    request.id,
                    JsonRpcError::new(codes::INVALID_PARAMS, "missing 'uri' field"),
                );
            }
        };

        match self.dispatcher.read_resource(&uri).await {
            Ok(content) => JsonRpcResponse::ok(
                request.id,
                serde_json::json!({
                    "contents": [{
                        "uri": uri,
                        "mimeType": "text/plain",
                        "text": content
                    }]
                }),
            ),
            Err(e) => JsonRpcResponse::err(
                request.id,
                JsonRpcError::new(codes::APPLICATION_ERROR, e.to_string()),
            ),
        }
    }
}

fn parse_call_params(params: &Value) -> Result<(String, Map<String, Value>)> {
    let params = params
        .as_object()
        .ok_or_else(|| ProteusError::Protocol("params must be an object".to_string()))?;

    let name = params
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| ProteusError::Protocol("missing 'name' field".to_string()))?
        .to_string();

    let arguments = match params.get("arguments") {
        Some(Value::Object(map)) => map.clone(),
        Some(Value::Null) | None => Map::new(),
        Some(_) => {
            return Err(ProteusError::Protocol(
                "'arguments' must be an object".to_string(),
            ))
        }
    };

    Ok((name, arguments))
}
