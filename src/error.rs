//! Error types for the Proteus server
//!
//! Structured error definitions using thiserror. Only the lookup failures
//! (`ToolNotFound`, `ResourceNotFound`) surface to MCP clients as protocol
//! errors; everything raised inside a tool body is absorbed by the execution
//! engine and reported as content (see [`crate::engine::ExecutionResult`]).

use thiserror::Error;

/// Main error type for Proteus operations
#[derive(Error, Debug)]
pub enum ProteusError {
    /// Tool name lookup missed both the built-ins and the registry snapshot
    #[error("Tool {0} not found")]
    ToolNotFound(String),

    /// Resource uri lookup missed the registry snapshot
    #[error("Resource {0} not found")]
    ResourceNotFound(String),

    /// Configuration could not be loaded, parsed, or saved
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed protocol request (bad params, wrong shapes)
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML configuration parse error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for Proteus operations
pub type Result<T> = std::result::Result<T, ProteusError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProteusError::ToolNotFound("frobnicate".to_string());
        assert_eq!(err.to_string(), "Tool frobnicate not found");

        let err = ProteusError::ResourceNotFound("missing://x".to_string());
        assert_eq!(err.to_string(), "Resource missing://x not found");
    }

    #[test]
    fn test_yaml_conversion() {
        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>("{unclosed").unwrap_err();
        let err: ProteusError = yaml_err.into();
        assert!(matches!(err, ProteusError::Yaml(_)));
    }
}
