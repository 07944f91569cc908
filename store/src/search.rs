//! Two-tier free-text search
//!
//! ## Tier 1: FTS5 index
//!
//! Plain queries are sanitized into a single literal phrase so FTS5 grammar
//! characters in user text cannot change the meaning of the query. With
//! `enable_advanced_syntax` the query is passed through verbatim and may use
//! `AND`/`OR`/`NOT`, quoted phrases, prefixes and column filters.
//! Hits are ordered by FTS5 rank; the reported score is `|rank|`.
//!
//! ## Tier 2: substring fallback
//!
//! Used only when FTS5 rejects a plain (non-advanced) query. Every
//! whitespace-separated token must occur in `content` (order-independent).
//! Hits are ordered newest first and all carry a score of 0.5.
//!
//! An advanced query that FTS5 rejects is reported as `Error::SearchSyntax`
//! and never degraded.

use rusqlite::params_from_iter;
use rusqlite::types::Value;
use tracing::{debug, warn};

use crate::db::MemoryDb;
use crate::error::{Error, Result};
use crate::query::{contains_pattern, Predicates, NEWEST_FIRST};
use crate::record::{memory_from_row, MEMORY_COLUMNS};
use crate::types::{
    clamp_limit, SearchRequest, SearchResult, SearchTier, FALLBACK_SCORE, SEARCH_DEFAULT_LIMIT,
    SEARCH_MAX_LIMIT,
};

/// Result of running a query against the FTS5 index
#[derive(Debug)]
enum IndexOutcome {
    Hits(Vec<SearchResult>),
    /// FTS5 could not parse the query; carries the parser message
    Rejected(String),
}

/// Characters with meaning in the FTS5 query grammar
fn is_fts_syntax_char(c: char) -> bool {
    matches!(
        c,
        '^' | '+' | '-' | '*' | '\'' | '"' | '~' | ':' | '(' | ')' | '{' | '}' | '[' | ']'
    )
}

/// Reduce a raw query to one quoted FTS5 phrase
///
/// Grammar characters become spaces and runs of whitespace collapse to one.
/// If nothing is left, the raw query is returned unchanged so the search is
/// never silently widened to an empty query.
pub fn sanitize_fts_query(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| if is_fts_syntax_char(c) { ' ' } else { c })
        .collect();
    let words: Vec<&str> = cleaned.split_whitespace().collect();

    if words.is_empty() {
        raw.to_string()
    } else {
        format!("\"{}\"", words.join(" "))
    }
}

/// Parser message when the error is SQLite's generic SQLITE_ERROR, which is how FTS5
/// reports query parse failures. Busy, I/O and corruption errors carry other
/// codes and are not treated as query problems.
fn rejection_message(err: &rusqlite::Error) -> Option<String> {
    match err {
        rusqlite::Error::SqliteFailure(ffi_err, msg)
            if ffi_err.extended_code == rusqlite::ffi::SQLITE_ERROR =>
        {
            Some(msg.clone().unwrap_or_else(|| ffi_err.to_string()))
        }
        _ => None,
    }
}

impl MemoryDb {
    /// Search memories, falling back to substring matching when a plain
    /// query cannot be parsed by the index
    ///
    /// Blank queries are not rejected. An empty query is refused by FTS5 and
    /// degrades to a fallback that matches every record, while a
    /// whitespace-only query is accepted by FTS5 and matches nothing.
    pub fn search(&self, request: &SearchRequest) -> Result<Vec<SearchResult>> {
        let limit = clamp_limit(request.limit, SEARCH_DEFAULT_LIMIT, SEARCH_MAX_LIMIT);
        let advanced = request.enable_advanced_syntax;
        let fts_query = if advanced {
            request.query.clone()
        } else {
            sanitize_fts_query(&request.query)
        };

        match self.index_search(&fts_query, request, limit)? {
            IndexOutcome::Hits(hits) => {
                debug!(query = %fts_query, limit, returned = hits.len(), "Index search");
                Ok(hits)
            }
            IndexOutcome::Rejected(message) if advanced => {
                debug!(query = %fts_query, %message, "Advanced query rejected");
                Err(Error::SearchSyntax(message))
            }
            IndexOutcome::Rejected(message) => {
                warn!(query = %fts_query, %message, "Index rejected query, using fallback search");
                self.fallback_search(request)
            }
        }
    }

    /// Tier 1: FTS5 match joined with structured filters, ordered by rank
    fn index_search(
        &self,
        fts_query: &str,
        request: &SearchRequest,
        limit: usize,
    ) -> Result<IndexOutcome> {
        let mut predicates = Predicates::default();
        predicates.push("memories_fts MATCH ?", fts_query.to_string());
        predicates.scope(request.area, request.project.as_deref());

        let sql = format!(
            "SELECT {MEMORY_COLUMNS}, memories_fts.rank
             FROM memories_fts
             JOIN memories m ON m.rowid = memories_fts.rowid
             WHERE {}
             ORDER BY memories_fts.rank
             LIMIT ?",
            predicates.where_clause()
        );
        let binds = predicates.binds_with_limit(limit);

        let run = || -> rusqlite::Result<Vec<SearchResult>> {
            let mut stmt = self.conn().prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(binds.iter()), |row| {
                let memory = memory_from_row(row)?;
                let rank: Option<f64> = row.get(7)?;
                Ok(SearchResult {
                    memory,
                    score: rank.map(f64::abs).filter(|s| s.is_finite()).unwrap_or(0.0),
                    tier: SearchTier::Index,
                })
            })?;
            let hits = rows.collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(hits)
        };

        match run() {
            Ok(hits) => Ok(IndexOutcome::Hits(hits)),
            Err(err) => match rejection_message(&err) {
                Some(message) => Ok(IndexOutcome::Rejected(message)),
                None => Err(Error::Storage(err)),
            },
        }
    }

    /// Tier 2: every whitespace token must be a substring of `content`
    ///
    /// A query with no tokens is matched as a single raw substring.
    pub fn fallback_search(&self, request: &SearchRequest) -> Result<Vec<SearchResult>> {
        let limit = clamp_limit(request.limit, SEARCH_DEFAULT_LIMIT, SEARCH_MAX_LIMIT);

        let mut predicates = Predicates::default();
        let words: Vec<&str> = request.query.split_whitespace().collect();
        if words.is_empty() {
            predicates.push(
                "m.content LIKE ? ESCAPE '\\'",
                contains_pattern(&request.query),
            );
        } else {
            for word in &words {
                predicates.push("m.content LIKE ? ESCAPE '\\'", contains_pattern(word));
            }
        }
        predicates.scope(request.area, request.project.as_deref());

        let sql = format!(
            "SELECT {MEMORY_COLUMNS} FROM memories m WHERE {} {NEWEST_FIRST} LIMIT ?",
            predicates.where_clause()
        );
        let binds: Vec<Value> = predicates.binds_with_limit(limit);

        let mut stmt = self.conn().prepare(&sql)?;
        let hits = stmt
            .query_map(params_from_iter(binds.iter()), |row| {
                Ok(SearchResult {
                    memory: memory_from_row(row)?,
                    score: FALLBACK_SCORE,
                    tier: SearchTier::Fallback,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        debug!(tokens = words.len(), limit, returned = hits.len(), "Fallback search");
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Area, NewMemory};

    fn seeded() -> MemoryDb {
        let db = MemoryDb::open_in_memory().unwrap();
        db.add(NewMemory::new("typescript is rigorous")).unwrap();
        db.add(NewMemory::new("python is dynamic")).unwrap();
        db.add(NewMemory::new("typescript and python are cool")).unwrap();
        db
    }

    fn advanced(query: &str) -> SearchRequest {
        SearchRequest {
            enable_advanced_syntax: true,
            ..SearchRequest::new(query)
        }
    }

    #[test]
    fn test_sanitize_wraps_plain_words_as_phrase() {
        assert_eq!(sanitize_fts_query("hello world"), "\"hello world\"");
        assert_eq!(
            sanitize_fts_query("  c++ -flag \"quoted\"  col:value* "),
            "\"c flag quoted col value\""
        );
    }

    #[test]
    fn test_sanitize_keeps_boolean_words_literal() {
        assert_eq!(
            sanitize_fts_query("typescript AND rigorous"),
            "\"typescript AND rigorous\""
        );
    }

    #[test]
    fn test_sanitize_only_special_chars_returns_raw() {
        assert_eq!(sanitize_fts_query("\"*^~"), "\"*^~");
        assert_eq!(sanitize_fts_query("   "), "   ");
    }

    #[test]
    fn test_plain_search_ranks_with_positive_scores() {
        let db = seeded();
        let hits = db.search(&SearchRequest::new("typescript")).unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|h| h.tier == SearchTier::Index));
        assert!(hits.iter().all(|h| h.score >= 0.0));
        assert!(hits.iter().all(|h| h.memory.content.contains("typescript")));
    }

    #[test]
    fn test_advanced_boolean_and() {
        let db = seeded();
        let hits = db.search(&advanced("typescript AND rigorous")).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].memory.content, "typescript is rigorous");
    }

    #[test]
    fn test_advanced_not_with_quoted_terms() {
        let db = seeded();
        let hits = db.search(&advanced("\"typescript\" NOT \"dynamic\"")).unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|h| !h.memory.content.contains("dynamic")));
    }

    #[test]
    fn test_plain_mode_treats_operators_as_phrase() {
        let db = seeded();
        let hits = db.search(&SearchRequest::new("typescript AND rigorous")).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_advanced_syntax_error_is_surfaced() {
        let db = seeded();
        let err = db.search(&advanced("\"unclosed")).unwrap_err();
        assert!(matches!(err, Error::SearchSyntax(_)));
    }

    #[test]
    fn test_plain_mode_never_raises_on_bad_syntax() {
        let db = seeded();
        let hits = db.search(&SearchRequest::new("\"unclosed")).unwrap();
        assert!(hits.is_empty());
        assert!(db.search(&SearchRequest::new("\"")).is_ok());
    }

    #[test]
    fn test_only_special_chars_degrades_to_fallback() {
        let db = MemoryDb::open_in_memory().unwrap();
        db.add(NewMemory::new("rated ***** by everyone")).unwrap();
        db.add(NewMemory::new("nothing special")).unwrap();

        let hits = db.search(&SearchRequest::new("***")).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].tier, SearchTier::Fallback);
        assert_eq!(hits[0].score, FALLBACK_SCORE);
        assert_eq!(hits[0].memory.content, "rated ***** by everyone");
    }

    #[test]
    fn test_blank_queries() {
        let db = seeded();

        let empty = db.search(&SearchRequest::new("")).unwrap();
        assert_eq!(empty.len(), 3);
        assert!(empty.iter().all(|h| h.tier == SearchTier::Fallback));
        assert_eq!(empty[0].memory.content, "typescript and python are cool");

        assert!(db.search(&SearchRequest::new("   ")).unwrap().is_empty());
    }

    #[test]
    fn test_fallback_is_order_independent() {
        let db = MemoryDb::open_in_memory().unwrap();
        db.add(NewMemory::new("a configuracao do meu opencode eh legal"))
            .unwrap();
        db.add(NewMemory::new("apenas opencode aqui")).unwrap();

        let hits = db
            .fallback_search(&SearchRequest::new("opencode configuracao"))
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].memory.content.contains("configuracao do meu opencode"));
        assert_eq!(hits[0].score, 0.5);
    }

    #[test]
    fn test_fallback_wildcards_are_literal() {
        let db = MemoryDb::open_in_memory().unwrap();
        db.add(NewMemory::new("discount 50% today")).unwrap();
        db.add(NewMemory::new("discount 500 today")).unwrap();

        let hits = db.fallback_search(&SearchRequest::new("50%")).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].memory.content, "discount 50% today");
    }

    #[test]
    fn test_search_filters_by_area_and_project() {
        let db = MemoryDb::open_in_memory().unwrap();
        db.add(NewMemory::new("deploy checklist").area(Area::Solutions).project("alpha"))
            .unwrap();
        db.add(NewMemory::new("deploy checklist").area(Area::Solutions).project("beta"))
            .unwrap();
        db.add(NewMemory::new("deploy checklist").area(Area::General).project("alpha"))
            .unwrap();

        let request = SearchRequest {
            area: Some(Area::Solutions),
            project: Some("alpha".into()),
            ..SearchRequest::new("deploy")
        };
        let hits = db.search(&request).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].memory.area, Area::Solutions);
        assert_eq!(hits[0].memory.project.as_deref(), Some("alpha"));

        let fallback = db.fallback_search(&request).unwrap();
        assert_eq!(fallback.len(), 1);
    }

    #[test]
    fn test_search_matches_project_and_tags() {
        let db = MemoryDb::open_in_memory().unwrap();
        db.add(NewMemory::new("unrelated body").project("kraken")).unwrap();
        db.add(NewMemory::new("another body").tags(["leviathan"])).unwrap();

        assert_eq!(db.search(&SearchRequest::new("kraken")).unwrap().len(), 1);
        assert_eq!(db.search(&SearchRequest::new("leviathan")).unwrap().len(), 1);
    }

    #[test]
    fn test_search_limit_default_and_cap() {
        let db = MemoryDb::open_in_memory().unwrap();
        for i in 0..60 {
            db.add(NewMemory::new(format!("shared keyword {i}"))).unwrap();
        }

        assert_eq!(db.search(&SearchRequest::new("keyword")).unwrap().len(), 10);
        let oversized = SearchRequest {
            limit: Some(500),
            ..SearchRequest::new("keyword")
        };
        assert_eq!(db.search(&oversized).unwrap().len(), 50);
        assert_eq!(db.fallback_search(&oversized).unwrap().len(), 50);
    }
}
