//! memory_list: browse memories, newest first

use omni_memory_store::types::LIST_MAX_LIMIT;
use omni_memory_store::{Area, ListFilter, MemoryDb};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::tools::metadata::{area_schema, object_schema, ToolMetadata};
use crate::tools::{check_limit, preview, ToolError, ToolResponse};

pub const NAME: &str = "memory_list";

const PREVIEW_CHARS: usize = 150;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListRequest {
    #[serde(default)]
    pub area: Option<Area>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl ListRequest {
    pub fn validate(&self) -> Result<(), ToolError> {
        check_limit(self.limit, LIST_MAX_LIMIT)
    }

    fn filter_summary(&self) -> String {
        let mut filters = Vec::new();
        if let Some(area) = self.area {
            filters.push(format!("area={area}"));
        }
        if let Some(ref project) = self.project {
            filters.push(format!("project={project}"));
        }
        if let Some(ref tag) = self.tag {
            filters.push(format!("tag={tag}"));
        }
        if filters.is_empty() {
            String::new()
        } else {
            format!(" with filters: {}", filters.join(", "))
        }
    }
}

pub fn metadata() -> ToolMetadata {
    ToolMetadata::new(
        NAME,
        "List memories with optional filters by area, project, or tag.",
        object_schema(
            json!({
                "area": area_schema("Filter by area"),
                "project": { "type": "string", "description": "Filter by project" },
                "tag": { "type": "string", "description": "Filter by tag" },
                "limit": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": LIST_MAX_LIMIT,
                    "description": "Max results (default: 50, max: 100)",
                },
            }),
            &[],
        ),
    )
    .with_example("Recent snippets", json!({ "area": "snippets", "limit": 10 }))
}

pub fn handle(db: &MemoryDb, request: ListRequest) -> ToolResponse {
    let filter = ListFilter {
        area: request.area,
        project: request.project.clone(),
        tag: request.tag.clone(),
        limit: request.limit,
    };

    let memories = match db.list(&filter) {
        Ok(memories) => memories,
        Err(e) => return ToolResponse::error(format!("Failed to list memories: {e}")),
    };

    if memories.is_empty() {
        return ToolResponse::ok(format!("No memories found{}", request.filter_summary()));
    }

    let entries: Vec<String> = memories
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let project = m
                .project
                .as_ref()
                .map(|p| format!(" [{p}]"))
                .unwrap_or_default();
            let tags = if m.tags.is_empty() {
                String::new()
            } else {
                format!(" #{}", m.tags.join(" #"))
            };
            format!(
                "{}. [{}]{project}{tags}\n   ID: {}\n   {}",
                i + 1,
                m.area,
                m.id,
                preview(&m.content, PREVIEW_CHARS)
            )
        })
        .collect();

    ToolResponse::ok(format!(
        "{} memories:\n\n{}",
        memories.len(),
        entries.join("\n\n")
    ))
}
