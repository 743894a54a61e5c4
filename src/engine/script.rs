//! Tool-body step language
//!
//! Tool bodies are parsed into a flat sequence of steps before evaluation.
//! The language is line-oriented: blank lines and `#` comments are skipped,
//! every other line is one of four verbs.
//!
//! ```text
//! let greeting = Hello, {{ name }}!
//! search hits = {{ query }}
//! add doc_id = {{ note }}
//! return {{ greeting }}
//! ```
//!
//! `let` binds a rendered template; `search` and `add` are capability
//! operations against the memory store binding their result; `return`
//! finishes the script with a rendered value. Templates are literal text
//! with `{{ ... }}` minijinja-expression interpolations; the caller's
//! arguments (and earlier bindings) are in scope by name.

use thiserror::Error;

/// A parsed tool-body script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub(crate) steps: Vec<Step>,
}

/// One step of a tool body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Bind the rendered template under `name`
    Let { name: String, template: String },

    /// Run a memory-store similarity search for the rendered query and bind
    /// the hits, joined by newlines, under `name`
    Search { name: String, template: String },

    /// Store the rendered content in the memory store and bind the new
    /// document id under `name`
    Add { name: String, template: String },

    /// Finish the script with the rendered template as its value
    Return { template: String },
}

/// Script parse failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// First word of a line is not a known verb
    #[error("line {line}: unknown directive '{verb}'")]
    UnknownDirective { line: usize, verb: String },

    /// Binding verb without a `name = template` tail
    #[error("line {line}: expected '{verb} <name> = <template>'")]
    MalformedBinding { line: usize, verb: String },

    /// Binding name is not an identifier
    #[error("line {line}: invalid binding name '{name}'")]
    InvalidName { line: usize, name: String },
}

impl Script {
    /// Parse a tool body into steps
    pub fn parse(body: &str) -> Result<Self, ScriptError> {
        let mut steps = Vec::new();

        for (index, raw_line) in body.lines().enumerate() {
            let line_no = index + 1;
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (verb, rest) = match line.split_once(char::is_whitespace) {
                Some((verb, rest)) => (verb, rest.trim()),
                None => (line, ""),
            };

            let step = match verb {
                "return" => Step::Return {
                    template: rest.to_string(),
                },
                "let" | "search" | "add" => {
                    let (name, template) = parse_binding(verb, rest, line_no)?;
                    match verb {
                        "let" => Step::Let { name, template },
                        "search" => Step::Search { name, template },
                        _ => Step::Add { name, template },
                    }
                }
                _ => {
                    return Err(ScriptError::UnknownDirective {
                        line: line_no,
                        verb: verb.to_string(),
                    })
                }
            };
            steps.push(step);
        }

        Ok(Self { steps })
    }
}

fn parse_binding(verb: &str, rest: &str, line: usize) -> Result<(String, String), ScriptError> {
    let (name, template) = rest.split_once('=').ok_or_else(|| ScriptError::MalformedBinding {
        line,
        verb: verb.to_string(),
    })?;

    let name = name.trim();
    if !is_identifier(name) {
        return Err(ScriptError::InvalidName {
            line,
            name: name.to_string(),
        });
    }

    Ok((name.to_string(), template.trim().to_string()))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
