//! Omni Memory store: durable, searchable memory records on SQLite
//!
//! Records live in one SQLite file (or a volatile in-memory store) with an
//! FTS5 index kept in lockstep by triggers. All operations are synchronous
//! and go through a single `MemoryDb` handle.

pub mod config;
pub mod db;
pub mod error;
pub mod paths;
pub mod query;
pub mod record;
pub mod search;
pub mod stats;
pub mod types;

pub use config::StoreSettings;
pub use db::MemoryDb;
pub use error::{Error, Result};
pub use paths::{resolve_storage_paths, DbLocation, StoragePaths};
pub use search::sanitize_fts_query;
pub use types::{
    Area, ListFilter, Memory, MemoryPatch, MemoryStats, NewMemory, SearchRequest, SearchResult,
    SearchTier,
};
