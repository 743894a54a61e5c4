//! Tool-body execution engine
//!
//! Interprets a tool definition's body as a script in the step language
//! (see [`script`]), binds the caller's arguments as local variables, and
//! runs it to a single completion. Every fault (parse error, template
//! error, undefined variable, capability misuse) is captured at this
//! boundary and converted to [`ExecutionResult::Failed`]; nothing
//! propagates to the dispatcher as an error or a panic.
//!
//! This is an interpretation boundary, not a hardened sandbox. The original
//! design executed arbitrary operator-supplied code; Proteus deliberately
//! narrows tool bodies to the four-verb step language so the capability set
//! is enforced by construction. There are still no resource quotas: a
//! pathological template can burn CPU, and configuration is trusted.

pub mod script;

use crate::storage::MemoryStore;
use minijinja::value::ValueKind;
use minijinja::{Environment, UndefinedBehavior};
use script::{Script, ScriptError, Step};
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Number of knowledge-base hits a `search` step binds
const SEARCH_RESULTS: usize = 3;

/// Prefix carried by every captured failure message
const FAILURE_PREFIX: &str = "Execution Error: ";

/// Outcome of one tool-body execution
///
/// `Failed` is a content-level outcome, not a protocol error: the dispatcher
/// returns the message to the caller as normal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionResult {
    /// The script completed; the value is its textual result
    Success(String),

    /// A fault was captured; the message starts with `Execution Error: `
    Failed(String),
}

impl ExecutionResult {
    /// The textual payload, regardless of outcome
    pub fn text(&self) -> &str {
        match self {
            Self::Success(text) | Self::Failed(text) => text,
        }
    }

    /// Whether the script completed without a fault
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// The external operations a tool body may use during execution
///
/// Execution sees exactly what is injected here and nothing else from host
/// process state.
#[derive(Default, Clone)]
pub struct Capabilities {
    memory_store: Option<Arc<dyn MemoryStore>>,
}

impl Capabilities {
    /// An empty capability set
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant access to the memory store
    pub fn with_memory_store(mut self, store: Arc<dyn MemoryStore>) -> Self {
        self.memory_store = Some(store);
        self
    }

    fn memory_store(&self) -> Result<&dyn MemoryStore, Fault> {
        self.memory_store
            .as_deref()
            .ok_or(Fault::CapabilityMisuse("memory_store"))
    }
}

/// Internal fault taxonomy; never leaves this module
#[derive(Error, Debug)]
enum Fault {
    #[error("{0}")]
    Script(#[from] ScriptError),

    #[error("template error: {0}")]
    Template(String),

    #[error("capability '{0}' is not available to this tool")]
    CapabilityMisuse(&'static str),

    #[error("memory store operation failed: {0}")]
    Store(String),
}

/// Interprets tool bodies with argument binding and fault capture
#[derive(Default)]
pub struct ExecutionEngine;

impl ExecutionEngine {
    /// Create an engine
    pub fn new() -> Self {
        Self
    }

    /// Execute `body` with `args` bound as local variables
    ///
    /// A single suspend point from the caller's perspective: the future
    /// completes exactly once with success or failure. Dropping it at a
    /// capability-op await cancels the script cleanly.
    pub async fn execute(
        &self,
        body: &str,
        args: &Map<String, Value>,
        capabilities: &Capabilities,
    ) -> ExecutionResult {
        match self.run(body, args, capabilities).await {
            Ok(text) => ExecutionResult::Success(text),
            Err(fault) => {
                debug!("Tool body fault: {}", fault);
                ExecutionResult::Failed(format!("{FAILURE_PREFIX}{fault}"))
            }
        }
    }

    async fn run(
        &self,
        body: &str,
        args: &Map<String, Value>,
        capabilities: &Capabilities,
    ) -> Result<String, Fault> {
        let script = Script::parse(body)?;

        let mut environment = Environment::new();
        environment.set_undefined_behavior(UndefinedBehavior::Strict);

        let mut bindings = args.clone();
        let mut last_value = String::new();

        for step in &script.steps {
            match step {
                Step::Let { name, template } => {
                    let value = render(&environment, template, &bindings)?;
                    last_value = value.clone();
                    bindings.insert(name.clone(), Value::String(value));
                }
                Step::Search { name, template } => {
                    let query = render(&environment, template, &bindings)?;
                    let hits = capabilities
                        .memory_store()?
                        .search(&query, SEARCH_RESULTS)
                        .await
                        .map_err(|e| Fault::Store(e.to_string()))?;
                    let joined = hits.join("\n");
                    last_value = joined.clone();
                    bindings.insert(name.clone(), Value::String(joined));
                }
                Step::Add { name, template } => {
                    let content = render(&environment, template, &bindings)?;
                    let id = capabilities
                        .memory_store()?
                        .add(&content)
                        .await
                        .map_err(|e| Fault::Store(e.to_string()))?;
                    last_value = id.clone();
                    bindings.insert(name.clone(), Value::String(id));
                }
                Step::Return { template } => {
                    return render(&environment, template, &bindings);
                }
            }
        }

        // No explicit return: the script's value is its final binding
        Ok(last_value)
    }
}

/// Render a template by evaluating each `{{ ... }}` interpolation
///
/// Expressions are evaluated to values before formatting so faults the
/// text renderer would paper over are caught: an undefined result or a
/// non-finite number (minijinja evaluates `1 / 0` to `inf` rather than
/// erroring) is a fault, not output.
fn render<'s>(
    environment: &Environment<'s>,
    template: &'s str,
    bindings: &Map<String, Value>,
) -> Result<String, Fault> {
    let mut output = String::new();
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        output.push_str(&rest[..start]);
        let tail = &rest[start + 2..];
        let Some(end) = tail.find("}}") else {
            return Err(Fault::Template("unclosed '{{' in template".to_string()));
        };

        let source = tail[..end].trim();
        let value = environment
            .compile_expression(source)
            .map_err(|error| Fault::Template(error.to_string()))?
            .eval(bindings)
            .map_err(|error| Fault::Template(error.to_string()))?;

        if value.is_undefined() {
            return Err(Fault::Template(format!("'{source}' is undefined")));
        }

        let rendered = value.to_string();
        if value.kind() == ValueKind::Number && !is_finite_number(&rendered) {
            return Err(Fault::Template(format!(
                "'{source}' produced a non-finite number"
            )));
        }

        output.push_str(&rendered);
        rest = &tail[end + 2..];
    }

    output.push_str(rest);
    Ok(output)
}

fn is_finite_number(rendered: &str) -> bool {
    !matches!(rendered, "inf" | "-inf" | "nan" | "-nan" | "NaN" | "-NaN")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LexicalStore;

    fn args(pairs: &[(&str, &str)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect()
    }

    fn with_store() -> Capabilities {
        Capabilities::new().with_memory_store(Arc::new(LexicalStore::new()))
    }

    #[tokio::test]
    async fn test_echo_returns_argument_unchanged() {
        let engine = ExecutionEngine::new();
        let result = engine
            .execute("return {{ message }}", &args(&[("message", "hi")]), &with_store())
            .await;
        assert_eq!(result, ExecutionResult::Success("hi".to_string()));
    }

    #[tokio::test]
    async fn test_let_bindings_compose() {
        let engine = ExecutionEngine::new();
        let body = "\
let greeting = Hello, {{ name }}!
return {{ greeting }} {{ greeting }}";
        let result = engine
            .execute(body, &args(&[("name", "Ada")]), &with_store())
            .await;
        assert_eq!(
            result,
            ExecutionResult::Success("Hello, Ada! Hello, Ada!".to_string())
        );
    }

    #[tokio::test]
    async fn test_no_return_yields_final_binding() {
        let engine = ExecutionEngine::new();
        let result = engine
            .execute("let x = {{ a }}\nlet y = {{ a }}{{ a }}", &args(&[("a", "z")]), &with_store())
            .await;
        assert_eq!(result, ExecutionResult::Success("zz".to_string()));
    }

    #[tokio::test]
    async fn test_empty_body_yields_empty_text() {
        let engine = ExecutionEngine::new();
        let result = engine.execute("", &Map::new(), &with_store()).await;
        assert_eq!(result, ExecutionResult::Success(String::new()));
    }

    #[tokio::test]
    async fn test_runtime_fault_is_captured_with_prefix() {
        let engine = ExecutionEngine::new();
        let result = engine
            .execute("return {{ 1 / 0 }}", &Map::new(), &with_store())
            .await;
        match result {
            ExecutionResult::Failed(message) => {
                assert!(message.starts_with("Execution Error: "), "got: {message}");
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_division_fault_inside_surrounding_text() {
        let engine = ExecutionEngine::new();
        let result = engine
            .execute("return result: {{ 1 / 0 }}", &Map::new(), &with_store())
            .await;
        assert!(!result.is_success());
        assert!(result.text().starts_with("Execution Error: "));
        assert!(!result.text().contains("inf"));
    }

    #[tokio::test]
    async fn test_non_string_arguments_bind_as_values() {
        let engine = ExecutionEngine::new();
        let mut arguments = Map::new();
        arguments.insert("a".to_string(), serde_json::json!(2));
        arguments.insert("b".to_string(), serde_json::json!(3));

        let result = engine
            .execute("return {{ a + b }}", &arguments, &with_store())
            .await;
        assert_eq!(result, ExecutionResult::Success("5".to_string()));
    }

    #[tokio::test]
    async fn test_unclosed_interpolation_is_captured() {
        let engine = ExecutionEngine::new();
        let result = engine
            .execute("return {{ message", &args(&[("message", "hi")]), &with_store())
            .await;
        assert!(!result.is_success());
        assert!(result.text().contains("unclosed"));
    }

    #[tokio::test]
    async fn test_literal_inf_text_is_not_a_fault() {
        // Only numeric results are screened; the word itself is fine
        let engine = ExecutionEngine::new();
        let result = engine
            .execute("return {{ word }}", &args(&[("word", "inf")]), &with_store())
            .await;
        assert_eq!(result, ExecutionResult::Success("inf".to_string()));
    }

    #[tokio::test]
    async fn test_undefined_variable_is_captured() {
        let engine = ExecutionEngine::new();
        let result = engine
            .execute("return {{ nonexistent }}", &Map::new(), &with_store())
            .await;
        assert!(!result.is_success());
        assert!(result.text().starts_with("Execution Error: "));
    }

    #[tokio::test]
    async fn test_parse_error_is_captured() {
        let engine = ExecutionEngine::new();
        let result = engine
            .execute("import os", &Map::new(), &with_store())
            .await;
        assert!(!result.is_success());
        assert!(result.text().contains("unknown directive"));
    }

    #[tokio::test]
    async fn test_capability_misuse_without_store() {
        let engine = ExecutionEngine::new();
        let result = engine
            .execute(
                "search hits = {{ query }}",
                &args(&[("query", "anything")]),
                &Capabilities::new(),
            )
            .await;
        assert!(!result.is_success());
        assert!(result.text().contains("capability 'memory_store'"));
    }

    #[tokio::test]
    async fn test_add_then_search_roundtrip() {
        let engine = ExecutionEngine::new();
        let capabilities = with_store();

        let added = engine
            .execute(
                "add id = {{ note }}\nreturn stored {{ id }}",
                &args(&[("note", "rust ownership model")]),
                &capabilities,
            )
            .await;
        assert!(added.is_success());
        assert!(added.text().starts_with("stored "));

        let found = engine
            .execute(
                "search hits = {{ query }}\nreturn {{ hits }}",
                &args(&[("query", "ownership")]),
                &capabilities,
            )
            .await;
        assert_eq!(
            found,
            ExecutionResult::Success("rust ownership model".to_string())
        );
    }
}
