//! memory_delete: remove a memory by id

use omni_memory_store::MemoryDb;
use serde_json::json;

use crate::tools::get::IdRequest;
use crate::tools::metadata::{object_schema, ToolMetadata};
use crate::tools::ToolResponse;

pub const NAME: &str = "memory_delete";

pub fn metadata() -> ToolMetadata {
    ToolMetadata::new(
        NAME,
        "Delete a memory by its ID.",
        object_schema(
            json!({ "id": { "type": "string", "description": "The memory ID to delete" } }),
            &["id"],
        ),
    )
}

pub fn handle(db: &MemoryDb, request: IdRequest) -> ToolResponse {
    match db.get(&request.id) {
        Ok(Some(_)) => {}
        Ok(None) => return ToolResponse::error(format!("Memory not found: {}", request.id)),
        Err(e) => return ToolResponse::error(format!("Failed to delete memory: {e}")),
    }

    match db.delete(&request.id) {
        Ok(_) => ToolResponse::ok(format!("Memory deleted successfully\nID: {}", request.id)),
        Err(e) => ToolResponse::error(format!("Failed to delete memory: {e}")),
    }
}
