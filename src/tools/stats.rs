//! memory_stats: totals by area and project plus size on disk

use omni_memory_store::{MemoryDb, MemoryStats};
use serde_json::json;
use std::collections::BTreeMap;

use crate::tools::metadata::{object_schema, ToolMetadata};
use crate::tools::ToolResponse;

pub const NAME: &str = "memory_stats";

pub fn metadata() -> ToolMetadata {
    ToolMetadata::new(
        NAME,
        "Get statistics about the Omni Memory database, including total memories, size on disk, and counts by area and project.",
        object_schema(json!({}), &[]),
    )
}

pub fn handle(db: &MemoryDb) -> ToolResponse {
    match db.stats() {
        Ok(stats) => ToolResponse::ok(render(&stats)),
        Err(e) => ToolResponse::error(format!("Failed to retrieve stats: {e}")),
    }
}

/// Human-readable byte count: 1024-based, at most two decimals, trailing
/// zeros dropped
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}

fn bullet_list(counts: &BTreeMap<String, u64>) -> String {
    if counts.is_empty() {
        return "  (None)".to_string();
    }
    counts
        .iter()
        .map(|(key, count)| format!("  - {key}: {count}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render(stats: &MemoryStats) -> String {
    let size = match stats.total_size_bytes {
        Some(bytes) if bytes > 0 => format_bytes(bytes),
        _ => "Unknown (Memory DB)".to_string(),
    };

    format!(
        "Omni Memory Database Statistics:\n\
         Total Memories: {}\n\
         Total Size on Disk: {size}\n\
         \n\
         By Area:\n\
         {}\n\
         \n\
         By Project:\n\
         {}",
        stats.total_memories,
        bullet_list(&stats.by_area),
        bullet_list(&stats.by_project)
    )
}
