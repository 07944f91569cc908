//! memory_update: partial update of an existing memory
//!
//! `project: null` clears the project; an absent field is left untouched.

use omni_memory_store::{Area, MemoryDb, MemoryPatch};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::tools::metadata::{area_schema, object_schema, ToolMetadata};
use crate::tools::{double_option, ToolResponse};

pub const NAME: &str = "memory_update";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub id: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub area: Option<Area>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub project: Option<Option<String>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

pub fn metadata() -> ToolMetadata {
    ToolMetadata::new(
        NAME,
        "Update an existing memory's content, area, project, or tags.",
        object_schema(
            json!({
                "id": { "type": "string", "description": "The memory ID to update" },
                "content": { "type": "string", "description": "New content (optional)" },
                "area": area_schema("New area (optional)"),
                "project": {
                    "type": ["string", "null"],
                    "description": "New project (optional, null to clear)",
                },
                "tags": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "New tags (optional)",
                },
            }),
            &["id"],
        ),
    )
    .with_example(
        "Move a memory out of its project",
        json!({ "id": "<memory id>", "project": null }),
    )
}

pub fn handle(db: &MemoryDb, request: UpdateRequest) -> ToolResponse {
    match db.get(&request.id) {
        Ok(Some(_)) => {}
        Ok(None) => return ToolResponse::error(format!("Memory not found: {}", request.id)),
        Err(e) => return ToolResponse::error(format!("Failed to update memory: {e}")),
    }

    let patch = MemoryPatch {
        content: request.content,
        area: request.area,
        project: request.project,
        tags: request.tags,
    };

    match db.update(&request.id, patch) {
        Ok(0) => ToolResponse::ok(format!("No changes made to memory: {}", request.id)),
        Ok(changes) => ToolResponse::ok(format!(
            "Memory updated successfully\nID: {}\nChanges: {changes}",
            request.id
        )),
        Err(e) => ToolResponse::error(format!("Failed to update memory: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use omni_memory_store::NewMemory;

    #[test]
    fn test_project_null_vs_absent() {
        let absent: UpdateRequest = serde_json::from_value(json!({ "id": "x" })).unwrap();
        assert_eq!(absent.project, None);

        let null: UpdateRequest =
            serde_json::from_value(json!({ "id": "x", "project": null })).unwrap();
        assert_eq!(null.project, Some(None));

        let set: UpdateRequest =
            serde_json::from_value(json!({ "id": "x", "project": "p" })).unwrap();
        assert_eq!(set.project, Some(Some("p".into())));
    }

    #[test]
    fn test_update_reports_changes() {
        let db = MemoryDb::open_in_memory().unwrap();
        let id = db.add(NewMemory::new("before").project("p")).unwrap();

        let response = handle(
            &db,
            UpdateRequest {
                id: id.clone(),
                project: Some(None),
                ..UpdateRequest::default()
            },
        );
        assert_eq!(
            response.text,
            format!("Memory updated successfully\nID: {id}\nChanges: 1")
        );
        assert_eq!(db.require(&id).unwrap().project, None);
    }

    #[test]
    fn test_update_without_changes() {
        let db = MemoryDb::open_in_memory().unwrap();
        let id = db.add(NewMemory::new("same")).unwrap();

        let response = handle(
            &db,
            UpdateRequest {
                id: id.clone(),
                content: Some("same".into()),
                ..UpdateRequest::default()
            },
        );
        assert!(!response.is_error);
        assert_eq!(response.text, format!("No changes made to memory: {id}"));
    }

    #[test]
    fn test_update_missing_is_error() {
        let db = MemoryDb::open_in_memory().unwrap();
        let response = handle(
            &db,
            UpdateRequest {
                id: "ghost".into(),
                content: Some("x".into()),
                ..UpdateRequest::default()
            },
        );
        assert!(response.is_error);
        assert_eq!(response.text, "Memory not found: ghost");
    }

    #[test]
    fn test_update_blank_content_is_error() {
        let db = MemoryDb::open_in_memory().unwrap();
        let id = db.add(NewMemory::new("keep")).unwrap();

        let response = handle(
            &db,
            UpdateRequest {
                id: id.clone(),
                content: Some("   ".into()),
                ..UpdateRequest::default()
            },
        );
        assert!(response.is_error);
        assert!(response.text.starts_with("Failed to update memory: "));
        assert_eq!(db.require(&id).unwrap().content, "keep");
    }
}
