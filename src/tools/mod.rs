//! Memory tools exposed to agent clients
//!
//! # Architecture
//!
//! Each tool module owns three things:
//! - a typed request, deserialized from the JSON `arguments` object
//! - its `metadata()` (description + JSON Schema)
//! - a `handle()` that calls the store and renders a `ToolResponse`
//!
//! Argument problems (unknown tool, bad shape, out-of-range limit) are
//! `ToolError`s and never reach the store. Store failures are rendered as
//! `ToolResponse`s with `is_error` set, mirroring how clients display them.
//!
//! # Tools (7)
//!
//! 1. memory_add
//! 2. memory_get
//! 3. memory_update
//! 4. memory_delete
//! 5. memory_list
//! 6. memory_search
//! 7. memory_stats

pub mod add;
pub mod delete;
pub mod get;
pub mod list;
pub mod metadata;
pub mod search;
pub mod stats;
pub mod update;

use omni_memory_store::MemoryDb;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use tracing::debug;

pub use metadata::{ToolExample, ToolMetadata};

/// Argument-level tool errors
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

/// Rendered outcome of a tool call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResponse {
    pub text: String,
    pub is_error: bool,
}

impl ToolResponse {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }

    /// `tools/call` result payload
    pub fn to_call_result(&self) -> Value {
        let mut result = json!({
            "content": [ { "type": "text", "text": self.text } ],
        });
        if self.is_error {
            result["isError"] = Value::Bool(true);
        }
        result
    }
}

/// Metadata for every tool, in registration order
pub fn memory_tools() -> Vec<ToolMetadata> {
    vec![
        add::metadata(),
        get::metadata(),
        update::metadata(),
        delete::metadata(),
        list::metadata(),
        search::metadata(),
        stats::metadata(),
    ]
}

/// Dispatch a tool call by name
///
/// `arguments` may be `null` for tools that take none.
pub fn call_tool(db: &MemoryDb, name: &str, arguments: Value) -> Result<ToolResponse, ToolError> {
    debug!(tool = name, "Tool call");
    let response = match name {
        add::NAME => add::handle(db, parse_args(arguments)?),
        get::NAME => get::handle(db, parse_args(arguments)?),
        update::NAME => update::handle(db, parse_args(arguments)?),
        delete::NAME => delete::handle(db, parse_args(arguments)?),
        list::NAME => {
            let request: list::ListRequest = parse_args(arguments)?;
            request.validate()?;
            list::handle(db, request)
        }
        search::NAME => {
            let request: search::SearchArgs = parse_args(arguments)?;
            request.validate()?;
            search::handle(db, request)
        }
        stats::NAME => stats::handle(db),
        other => return Err(ToolError::UnknownTool(other.to_string())),
    };
    Ok(response)
}

fn parse_args<T: DeserializeOwned>(arguments: Value) -> Result<T, ToolError> {
    let arguments = match arguments {
        Value::Null => Value::Object(Map::new()),
        other => other,
    };
    serde_json::from_value(arguments).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

/// Reject a limit outside `1..=max`
pub(crate) fn check_limit(limit: Option<usize>, max: usize) -> Result<(), ToolError> {
    match limit {
        Some(n) if n < 1 || n > max => Err(ToolError::InvalidArguments(format!(
            "limit must be between 1 and {max}, got {n}"
        ))),
        _ => Ok(()),
    }
}

/// First `max` characters of `content`, with `...` when cut
pub(crate) fn preview(content: &str, max: usize) -> String {
    match content.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}

/// Deserialize a field that distinguishes "absent" from "null"
///
/// Use with `#[serde(default)]`: absent → `None`, `null` → `Some(None)`,
/// value → `Some(Some(value))`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    <Option<T> as serde::Deserialize>::deserialize(deserializer).map(Some)
}
