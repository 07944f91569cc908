//! memory_get: fetch one memory by id

use chrono::{DateTime, SecondsFormat, Utc};
use omni_memory_store::{Memory, MemoryDb};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::tools::metadata::{object_schema, ToolMetadata};
use crate::tools::ToolResponse;

pub const NAME: &str = "memory_get";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdRequest {
    pub id: String,
}

pub fn metadata() -> ToolMetadata {
    ToolMetadata::new(
        NAME,
        "Retrieve a specific memory by its ID.",
        object_schema(
            json!({ "id": { "type": "string", "description": "The memory ID to retrieve" } }),
            &["id"],
        ),
    )
}

pub fn handle(db: &MemoryDb, request: IdRequest) -> ToolResponse {
    match db.get(&request.id) {
        Ok(Some(memory)) => ToolResponse::ok(render(&memory)),
        Ok(None) => ToolResponse::error(format!("Memory not found: {}", request.id)),
        Err(e) => ToolResponse::error(format!("Failed to get memory: {e}")),
    }
}

pub(crate) fn timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn render(memory: &Memory) -> String {
    let mut text = format!("ID: {}\nArea: {}", memory.id, memory.area);
    if let Some(ref project) = memory.project {
        text.push_str(&format!("\nProject: {project}"));
    }
    if !memory.tags.is_empty() {
        text.push_str(&format!("\nTags: {}", memory.tags.join(", ")));
    }
    text.push_str(&format!(
        "\nCreated: {}\nUpdated: {}\n\n{}",
        timestamp(&memory.created_at),
        timestamp(&memory.updated_at),
        memory.content
    ));
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use omni_memory_store::{Area, NewMemory};

    #[test]
    fn test_get_renders_all_fields() {
        let db = MemoryDb::open_in_memory().unwrap();
        let id = db
            .add(
                NewMemory::new("body text")
                    .area(Area::Snippets)
                    .project("omni")
                    .tags(["a", "b"]),
            )
            .unwrap();

        let response = handle(&db, IdRequest { id: id.clone() });
        assert!(!response.is_error);
        assert!(response.text.starts_with(&format!("ID: {id}\nArea: snippets\nProject: omni\nTags: a, b\nCreated: ")));
        assert!(response.text.ends_with("\n\nbody text"));
    }

    #[test]
    fn test_get_omits_missing_project_and_tags() {
        let db = MemoryDb::open_in_memory().unwrap();
        let id = db.add(NewMemory::new("bare")).unwrap();

        let response = handle(&db, IdRequest { id });
        assert!(!response.text.contains("Project:"));
        assert!(!response.text.contains("Tags:"));
    }

    #[test]
    fn test_get_missing_is_error() {
        let db = MemoryDb::open_in_memory().unwrap();
        let response = handle(&db, IdRequest { id: "nope".into() });
        assert!(response.is_error);
        assert_eq!(response.text, "Memory not found: nope");
    }
}
