//! Memory recording: add, get, update, delete
//!
//! ## Write Ordering
//!
//! Every mutation is a single statement on `memories`; the FTS5 triggers run
//! inside that statement. Update additionally reads the current row inside
//! the same transaction so the merge sees a stable snapshot.
//!
//! ## Failure Semantics
//!
//! * Validation failures → nothing written
//! * Missing id on update/delete → `Ok(0)`, not an error
//! * No retries

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;
use uuid::Uuid;

use crate::db::MemoryDb;
use crate::error::{Error, Result};
use crate::types::{Area, Memory, MemoryPatch, NewMemory};

/// Columns selected for a full memory row, in `memory_from_row` order
pub(crate) const MEMORY_COLUMNS: &str =
    "m.id, m.content, m.area, m.project, m.tags, m.created_at, m.updated_at";

impl MemoryDb {
    /// Store a new memory and return its id
    ///
    /// Area defaults to `general`, tags to an empty list. An empty project
    /// is stored as absent.
    pub fn add(&self, new: NewMemory) -> Result<String> {
        validate_content(&new.content)?;

        let id = Uuid::new_v4().to_string();
        let area = new.area.unwrap_or_default();
        let project = normalize_project(new.project);
        let tags = encode_tags(&new.tags.unwrap_or_default())?;
        let now = format_timestamp(Utc::now());

        self.conn().execute(
            "INSERT INTO memories (id, content, area, project, tags, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![id, new.content, area.as_str(), project, tags, now],
        )?;

        debug!(%id, area = %area, "Memory added");
        Ok(id)
    }

    /// Fetch a memory by id
    pub fn get(&self, id: &str) -> Result<Option<Memory>> {
        let memory = get_memory(self.conn(), id)?;
        debug!(%id, found = memory.is_some(), "Memory fetched");
        Ok(memory)
    }

    /// Fetch a memory by id, treating absence as `Error::NotFound`
    pub fn require(&self, id: &str) -> Result<Memory> {
        self.get(id)?.ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Apply a partial update
    ///
    /// # Returns
    /// * `Ok(1)`: the row was rewritten and `updated_at` refreshed
    /// * `Ok(0)`: no such id, or the patch does not change any field
    pub fn update(&self, id: &str, patch: MemoryPatch) -> Result<usize> {
        if patch.is_empty() {
            debug!(%id, "Empty patch, nothing to update");
            return Ok(0);
        }
        if let Some(ref content) = patch.content {
            validate_content(content)?;
        }

        let tx = self.conn().unchecked_transaction()?;

        let Some(existing) = get_memory(&tx, id)? else {
            debug!(%id, "Update target not found");
            return Ok(0);
        };

        let content = patch.content.unwrap_or_else(|| existing.content.clone());
        let area = patch.area.unwrap_or(existing.area);
        let project = match patch.project {
            Some(project) => normalize_project(project),
            None => existing.project.clone(),
        };
        let tags = patch.tags.unwrap_or_else(|| existing.tags.clone());

        if content == existing.content
            && area == existing.area
            && project == existing.project
            && tags == existing.tags
        {
            debug!(%id, "Update is a no-op");
            return Ok(0);
        }

        // Keep updated_at strictly increasing even within one clock tick
        let now = Utc::now().max(existing.updated_at + Duration::microseconds(1));

        let changes = tx.execute(
            "UPDATE memories
             SET content = ?1, area = ?2, project = ?3, tags = ?4, updated_at = ?5
             WHERE id = ?6",
            params![
                content,
                area.as_str(),
                project,
                encode_tags(&tags)?,
                format_timestamp(now),
                id
            ],
        )?;
        tx.commit()?;

        debug!(%id, changes, "Memory updated");
        Ok(changes)
    }

    /// Delete a memory and its index entry
    ///
    /// Returns the number of rows removed (0 when absent).
    pub fn delete(&self, id: &str) -> Result<usize> {
        let changes = self
            .conn()
            .execute("DELETE FROM memories WHERE id = ?1", params![id])?;
        debug!(%id, changes, "Memory deleted");
        Ok(changes)
    }
}

fn get_memory(conn: &Connection, id: &str) -> Result<Option<Memory>> {
    let sql = format!("SELECT {MEMORY_COLUMNS} FROM memories m WHERE m.id = ?1");
    let memory = conn
        .query_row(&sql, params![id], memory_from_row)
        .optional()?;
    Ok(memory)
}

fn validate_content(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(Error::Validation("content must not be empty".to_string()));
    }
    Ok(())
}

fn normalize_project(project: Option<String>) -> Option<String> {
    project.filter(|p| !p.is_empty())
}

pub(crate) fn encode_tags(tags: &[String]) -> Result<String> {
    Ok(serde_json::to_string(tags)?)
}

/// Fixed-width RFC 3339 UTC timestamp; lexical order is chronological order
pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Map a row selected with `MEMORY_COLUMNS` (optionally followed by extra
/// columns) to a `Memory`
pub(crate) fn memory_from_row(row: &Row<'_>) -> rusqlite::Result<Memory> {
    let area: Option<String> = row.get(2)?;
    let tags_json: Option<String> = row.get(4)?;
    let tags = match tags_json.as_deref() {
        Some(json) if !json.is_empty() => serde_json::from_str(json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?,
        _ => Vec::new(),
    };
    let created_at: String = row.get(5)?;
    let updated_at: String = row.get(6)?;

    Ok(Memory {
        id: row.get(0)?,
        content: row.get(1)?,
        area: Area::from_stored(area.as_deref()),
        project: row.get(3)?,
        tags,
        created_at: parse_timestamp(5, &created_at)?,
        updated_at: parse_timestamp(6, &updated_at)?,
    })
}
