//! Tool metadata published through `tools/list`
//!
//! Each tool carries a description, a JSON Schema for its arguments and a
//! few usage examples. Examples are folded into the listed description so
//! clients that only read `description` still see them.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Complete tool metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolMetadata {
    /// Tool name (e.g., "memory_add", "memory_search")
    pub name: String,

    /// Human-readable description of what the tool does
    pub description: String,

    /// JSON Schema describing the `arguments` object
    pub input_schema: Value,

    /// Examples of proper usage
    pub examples: Vec<ToolExample>,
}

/// Usage example for a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolExample {
    /// When would you use this tool?
    pub scenario: String,

    /// Example arguments
    pub arguments: Value,
}

impl ToolMetadata {
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
            examples: Vec::new(),
        }
    }

    /// Add a usage example
    pub fn with_example(mut self, scenario: impl Into<String>, arguments: Value) -> Self {
        self.examples.push(ToolExample {
            scenario: scenario.into(),
            arguments,
        });
        self
    }

    /// Description with examples appended, one per line
    pub fn full_description(&self) -> String {
        if self.examples.is_empty() {
            return self.description.clone();
        }
        let mut text = self.description.clone();
        text.push_str("\n\nExamples:");
        for example in &self.examples {
            text.push_str(&format!("\n- {}: {}", example.scenario, example.arguments));
        }
        text
    }

    /// Entry for a `tools/list` response
    pub fn to_listing(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.full_description(),
            "inputSchema": self.input_schema,
        })
    }
}

/// `enum` schema fragment for the area argument
pub(crate) fn area_schema(description: &str) -> Value {
    json!({
        "type": "string",
        "enum": ["general", "snippets", "solutions", "preferences"],
        "description": description,
    })
}

/// Object schema with the given properties and required keys
pub(crate) fn object_schema(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}
