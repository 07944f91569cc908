//! Memory record and request/response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Default number of rows returned by list
pub const LIST_DEFAULT_LIMIT: usize = 50;
/// Hard cap for list, regardless of caller request
pub const LIST_MAX_LIMIT: usize = 100;
/// Default number of hits returned by search
pub const SEARCH_DEFAULT_LIMIT: usize = 10;
/// Hard cap for search, regardless of caller request
pub const SEARCH_MAX_LIMIT: usize = 50;
/// Score given to every fallback-tier hit
pub const FALLBACK_SCORE: f64 = 0.5;
/// Bucket used in stats for records without a project
pub const UNASSIGNED_PROJECT: &str = "unassigned";

/// Fixed category a memory belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Area {
    #[default]
    General,
    Snippets,
    Solutions,
    Preferences,
}

impl Area {
    pub const ALL: [Area; 4] = [
        Area::General,
        Area::Snippets,
        Area::Solutions,
        Area::Preferences,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Area::General => "general",
            Area::Snippets => "snippets",
            Area::Solutions => "solutions",
            Area::Preferences => "preferences",
        }
    }

    /// Read an area column; NULL, empty or unknown values resolve to `general`
    pub(crate) fn from_stored(value: Option<&str>) -> Area {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Area {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "general" => Ok(Area::General),
            "snippets" => Ok(Area::Snippets),
            "solutions" => Ok(Area::Solutions),
            "preferences" => Ok(Area::Preferences),
            other => Err(Error::Validation(format!(
                "unknown area '{other}' (expected one of: general, snippets, solutions, preferences)"
            ))),
        }
    }
}

/// A stored memory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    /// Unique identifier (UUID v4), immutable
    pub id: String,
    pub content: String,
    pub area: Area,
    /// Optional grouping label
    pub project: Option<String>,
    /// Insertion order preserved, duplicates allowed
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    /// Refreshed on every write
    pub updated_at: DateTime<Utc>,
}

/// Input for add
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewMemory {
    pub content: String,
    pub area: Option<Area>,
    pub project: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl NewMemory {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn area(mut self, area: Area) -> Self {
        self.area = Some(area);
        self
    }

    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }
}

/// Partial update. `None` leaves a field untouched.
///
/// `project` distinguishes three states: `None` (keep), `Some(None)` (clear)
/// and `Some(Some(value))` (set).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryPatch {
    pub content: Option<String>,
    pub area: Option<Area>,
    pub project: Option<Option<String>>,
    /// Replaces the whole list
    pub tags: Option<Vec<String>>,
}

impl MemoryPatch {
    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.area.is_none() && self.project.is_none() && self.tags.is_none()
    }
}

/// Filters for list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListFilter {
    pub area: Option<Area>,
    pub project: Option<String>,
    /// Exact tag membership
    pub tag: Option<String>,
    /// Default 50, capped at 100
    pub limit: Option<usize>,
}

/// Free-text search request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub area: Option<Area>,
    pub project: Option<String>,
    /// Default 10, capped at 50
    pub limit: Option<usize>,
    /// Pass the query to FTS5 verbatim instead of sanitizing it
    #[serde(default)]
    pub enable_advanced_syntax: bool,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }
}

/// Which tier produced a search hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchTier {
    /// FTS5 relevance-ranked match
    Index,
    /// Per-token substring match over content
    Fallback,
}

/// A search hit: the memory plus a non-negative relevance score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(flatten)]
    pub memory: Memory,
    pub score: f64,
    pub tier: SearchTier,
}

/// Aggregate statistics, computed fresh on every call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub total_memories: u64,
    pub by_area: BTreeMap<String, u64>,
    pub by_project: BTreeMap<String, u64>,
    /// `None` when the store lives only in memory
    pub total_size_bytes: Option<u64>,
}

/// Resolve a caller-supplied limit: absent or zero means `default`, anything
/// above `max` is clamped
pub(crate) fn clamp_limit(requested: Option<usize>, default: usize, max: usize) -> usize {
    match requested {
        None | Some(0) => default,
        Some(n) => n.min(max),
    }
}
