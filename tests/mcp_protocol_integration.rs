//! JSON-RPC protocol-level tests
//!
//! Feeds raw request lines through `McpServer::process_request` and checks
//! the wire-level behavior: routing, error codes, and the
//! content-vs-protocol-error split for tool failures.

use proteus_core::{
    CapabilityRegistry, Dispatcher, LexicalStore, McpServer, Metrics, ServerConfig, ToolDefinition,
};
use serde_json::json;
use std::sync::Arc;

fn server_with(tools: Vec<ToolDefinition>) -> McpServer {
    let config = ServerConfig {
        tools,
        ..Default::default()
    };
    let registry = Arc::new(CapabilityRegistry::from_config(&config));
    let store = Arc::new(LexicalStore::new());
    let metrics = Arc::new(Metrics::new());
    let dispatcher = Arc::new(Dispatcher::new(registry, store, metrics));
    McpServer::new(dispatcher, config.name, config.version)
}

fn echo_tool() -> ToolDefinition {
    ToolDefinition {
        name: "echo".to_string(),
        description: "Echo the message".to_string(),
        input_schema: json!({"type": "object"}),
        body: "return {{ message }}".to_string(),
    }
}

#[tokio::test]
async fn test_initialize_advertises_capabilities() {
    let server = server_with(vec![]);
    let response = server
        .process_request(r#"{"jsonrpc":"2.0","method":"initialize","id":1}"#)
        .await;

    let result = response.result.unwrap();
    assert_eq!(result["serverInfo"]["name"], "Proteus MCP Server");
    assert!(result["capabilities"]["tools"].is_object());
    assert!(result["capabilities"]["resources"].is_object());
}

#[tokio::test]
async fn test_tools_call_returns_text_content() {
    let server = server_with(vec![echo_tool()]);
    let request = json!({
        "jsonrpc": "2.0",
        "method": "tools/call",
        "params": {"name": "echo", "arguments": {"message": "hi"}},
        "id": 2
    });

    let response = server.process_request(&request.to_string()).await;
    assert!(response.error.is_none());
    assert_eq!(
        response.result.unwrap()["content"],
        json!([{"type": "text", "text": "hi"}])
    );
}

#[tokio::test]
async fn test_unknown_tool_is_application_error() {
    let server = server_with(vec![]);
    let request = json!({
        "jsonrpc": "2.0",
        "method": "tools/call",
        "params": {"name": "bogus"},
        "id": 3
    });

    let response = server.process_request(&request.to_string()).await;
    let error = response.error.unwrap();
    assert_eq!(error.code, -32000);
    assert!(error.message.contains("bogus"));
}

#[tokio::test]
async fn test_failing_tool_is_still_a_result() {
    let server = server_with(vec![ToolDefinition {
        name: "crash".to_string(),
        description: "Always faults".to_string(),
        input_schema: json!({"type": "object"}),
        body: "return {{ 1 / 0 }}".to_string(),
    }]);
    let request = json!({
        "jsonrpc": "2.0",
        "method": "tools/call",
        "params": {"name": "crash"},
        "id": 4
    });

    let response = server.process_request(&request.to_string()).await;
    assert!(response.error.is_none(), "execution failure must not be a protocol error");
    let text = response.result.unwrap()["content"][0]["text"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(text.starts_with("Execution Error:"));
}

#[tokio::test]
async fn test_resources_read_wraps_content() {
    let config: ServerConfig = serde_yaml::from_str(
        r#"
resources:
  - uri: "doc://x"
    name: X
    description: d
    content: "static text"
"#,
    )
    .unwrap();
    let registry = Arc::new(CapabilityRegistry::from_config(&config));
    let dispatcher = Arc::new(Dispatcher::new(
        registry,
        Arc::new(LexicalStore::new()),
        Arc::new(Metrics::new()),
    ));
    let server = McpServer::new(dispatcher, config.name, config.version);

    let request = json!({
        "jsonrpc": "2.0",
        "method": "resources/read",
        "params": {"uri": "doc://x"},
        "id": 5
    });
    let response = server.process_request(&request.to_string()).await;
    let contents = &response.result.unwrap()["contents"][0];
    assert_eq!(contents["text"], "static text");
    assert_eq!(contents["mimeType"], "text/plain");
}

#[tokio::test]
async fn test_malformed_json_is_parse_error() {
    let server = server_with(vec![]);
    let response = server.process_request("{not json").await;
    assert_eq!(response.error.unwrap().code, -32700);
}

#[tokio::test]
async fn test_unknown_method_is_method_not_found() {
    let server = server_with(vec![]);
    let response = server
        .process_request(r#"{"jsonrpc":"2.0","method":"prompts/list","id":6}"#)
        .await;
    assert_eq!(response.error.unwrap().code, -32601);
}

#[tokio::test]
async fn test_wrong_version_is_invalid_request() {
    let server = server_with(vec![]);
    let response = server
        .process_request(r#"{"jsonrpc":"1.0","method":"tools/list","id":7}"#)
        .await;
    assert_eq!(response.error.unwrap().code, -32600);
}
