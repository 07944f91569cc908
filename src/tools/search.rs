//! memory_search: relevance-ranked full-text search
//!
//! Plain queries are treated as a literal phrase. `enableAdvancedSyntax`
//! passes the query to FTS5 as written (AND/OR/NOT, quotes, prefixes).

use omni_memory_store::types::SEARCH_MAX_LIMIT;
use omni_memory_store::{Area, MemoryDb, SearchRequest};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::tools::metadata::{area_schema, object_schema, ToolMetadata};
use crate::tools::{check_limit, preview, ToolError, ToolResponse};

pub const NAME: &str = "memory_search";

const PREVIEW_CHARS: usize = 200;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchArgs {
    pub query: String,
    #[serde(default)]
    pub area: Option<Area>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub enable_advanced_syntax: bool,
}

impl SearchArgs {
    pub fn validate(&self) -> Result<(), ToolError> {
        check_limit(self.limit, SEARCH_MAX_LIMIT)
    }
}

pub fn metadata() -> ToolMetadata {
    ToolMetadata::new(
        NAME,
        "Full-text search across all memories using FTS5.",
        object_schema(
            json!({
                "query": { "type": "string", "description": "Search query" },
                "area": area_schema("Filter by area"),
                "project": { "type": "string", "description": "Filter by project" },
                "limit": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": SEARCH_MAX_LIMIT,
                    "description": "Max results (default: 10, max: 50)",
                },
                "enableAdvancedSyntax": {
                    "type": "boolean",
                    "description": "Pass the query to FTS5 unmodified (AND, OR, NOT, \"phrases\", prefix*). Syntax errors are reported instead of falling back.",
                },
            }),
            &["query"],
        ),
    )
    .with_example("Plain phrase", json!({ "query": "connection pool" }))
    .with_example(
        "Boolean query",
        json!({ "query": "typescript AND NOT dynamic", "enableAdvancedSyntax": true }),
    )
}

pub fn handle(db: &MemoryDb, args: SearchArgs) -> ToolResponse {
    let request = SearchRequest {
        query: args.query.clone(),
        area: args.area,
        project: args.project,
        limit: args.limit,
        enable_advanced_syntax: args.enable_advanced_syntax,
    };

    let results = match db.search(&request) {
        Ok(results) => results,
        Err(e) => return ToolResponse::error(format!("Search failed: {e}")),
    };

    if results.is_empty() {
        return ToolResponse::ok(format!("No memories found matching: \"{}\"", args.query));
    }

    let entries: Vec<String> = results
        .iter()
        .enumerate()
        .map(|(i, hit)| {
            let m = &hit.memory;
            let project = m
                .project
                .as_ref()
                .map(|p| format!(" [{p}]"))
                .unwrap_or_default();
            format!(
                "{}. ({:.0}%) [{}]{project}\n   ID: {}\n   {}",
                i + 1,
                hit.score * 100.0,
                m.area,
                m.id,
                preview(&m.content, PREVIEW_CHARS)
            )
        })
        .collect();

    ToolResponse::ok(format!(
        "Found {} memories for \"{}\":\n\n{}",
        results.len(),
        args.query,
        entries.join("\n\n")
    ))
}
