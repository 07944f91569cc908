//! memory_add: store a new memory

use omni_memory_store::{Area, MemoryDb, NewMemory};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::tools::metadata::{area_schema, object_schema, ToolMetadata};
use crate::tools::ToolResponse;

pub const NAME: &str = "memory_add";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddRequest {
    pub content: String,
    #[serde(default)]
    pub area: Option<Area>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

pub fn metadata() -> ToolMetadata {
    ToolMetadata::new(
        NAME,
        "Add a memory to the universal memory store. Memories can be searched and retrieved later.",
        object_schema(
            json!({
                "content": { "type": "string", "description": "The content to store in memory" },
                "area": area_schema("Memory area (default: general)"),
                "project": { "type": "string", "description": "Project identifier for organization" },
                "tags": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Tags for categorization",
                },
            }),
            &["content"],
        ),
    )
    .with_example(
        "Remember a fix for later",
        json!({
            "content": "Run sqlite with WAL to avoid reader stalls",
            "area": "solutions",
            "project": "omni",
            "tags": ["sqlite"],
        }),
    )
}

pub fn handle(db: &MemoryDb, request: AddRequest) -> ToolResponse {
    let new = NewMemory {
        content: request.content,
        area: request.area,
        project: request.project,
        tags: request.tags,
    };

    match db.add(new) {
        Ok(id) => ToolResponse::ok(format!("Memory added successfully\nID: {id}")),
        Err(e) => ToolResponse::error(format!("Failed to add memory: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_reports_id() {
        let db = MemoryDb::open_in_memory().unwrap();
        let response = handle(
            &db,
            AddRequest {
                content: "hello".into(),
                ..AddRequest::default()
            },
        );
        assert!(!response.is_error);
        let id = response.text.strip_prefix("Memory added successfully\nID: ").unwrap();
        assert_eq!(db.require(id).unwrap().content, "hello");
    }

    #[test]
    fn test_add_empty_content_is_error_response() {
        let db = MemoryDb::open_in_memory().unwrap();
        let response = handle(&db, AddRequest::default());
        assert!(response.is_error);
        assert!(response.text.starts_with("Failed to add memory: "));
    }
}
