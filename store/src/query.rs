//! Filtered listing with deterministic ordering
//!
//! Rows come back newest first (`created_at DESC`, ties broken by insertion
//! order), limited to 50 by default and never more than 100.

use rusqlite::params_from_iter;
use rusqlite::types::Value;
use tracing::debug;

use crate::db::MemoryDb;
use crate::error::Result;
use crate::record::{memory_from_row, MEMORY_COLUMNS};
use crate::types::{clamp_limit, Area, ListFilter, Memory, LIST_DEFAULT_LIMIT, LIST_MAX_LIMIT};

/// Ordering shared by list and the fallback search tier
pub(crate) const NEWEST_FIRST: &str = "ORDER BY m.created_at DESC, m.rowid DESC";

/// WHERE clause under construction, with positional bind values
#[derive(Debug, Default)]
pub(crate) struct Predicates {
    clauses: Vec<String>,
    binds: Vec<Value>,
}

impl Predicates {
    pub(crate) fn push(&mut self, clause: impl Into<String>, value: impl Into<Value>) {
        self.clauses.push(clause.into());
        self.binds.push(value.into());
    }

    /// `area` / `project` equality filters
    pub(crate) fn scope(&mut self, area: Option<Area>, project: Option<&str>) {
        if let Some(area) = area {
            self.push("m.area = ?", area.as_str().to_string());
        }
        if let Some(project) = project {
            self.push("m.project = ?", project.to_string());
        }
    }

    pub(crate) fn where_clause(&self) -> String {
        if self.clauses.is_empty() {
            "1=1".to_string()
        } else {
            self.clauses.join(" AND ")
        }
    }

    /// Bind values followed by the LIMIT value
    pub(crate) fn binds_with_limit(mut self, limit: usize) -> Vec<Value> {
        self.binds.push(Value::Integer(limit as i64));
        self.binds
    }
}

/// Escape `%`, `_` and `\` so the text matches literally in
/// `LIKE ... ESCAPE '\'`
pub(crate) fn like_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// `%<text>%` substring pattern
pub(crate) fn contains_pattern(text: &str) -> String {
    format!("%{}%", like_escape(text))
}

impl MemoryDb {
    /// List memories matching all given filters, newest first
    ///
    /// The tag filter is a case-sensitive equality test against each element
    /// of the stored JSON list, so `important` never matches `importantly`.
    pub fn list(&self, filter: &ListFilter) -> Result<Vec<Memory>> {
        let limit = clamp_limit(filter.limit, LIST_DEFAULT_LIMIT, LIST_MAX_LIMIT);

        let mut predicates = Predicates::default();
        predicates.scope(filter.area, filter.project.as_deref());
        if let Some(ref tag) = filter.tag {
            predicates.push(
                "EXISTS (SELECT 1 FROM json_each(m.tags) WHERE json_each.value = ?)",
                tag.clone(),
            );
        }

        let sql = format!(
            "SELECT {MEMORY_COLUMNS} FROM memories m WHERE {} {NEWEST_FIRST} LIMIT ?",
            predicates.where_clause()
        );

        let binds = predicates.binds_with_limit(limit);
        let mut stmt = self.conn().prepare(&sql)?;
        let memories = stmt
            .query_map(params_from_iter(binds.iter()), memory_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        debug!(limit, returned = memories.len(), "Listed memories");
        Ok(memories)
    }
}
