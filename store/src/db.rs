//! Memory database: SQLite schema initialization and connection management
//!
//! ## Architecture
//!
//! - `MemoryDb::open()`: create storage directories, open the store file,
//!   enable WAL and create the schema if missing
//! - `memories` is the canonical table, keyed by `id`
//! - `memories_fts` is an FTS5 external-content index over
//!   (content, project, tags), kept in sync by three triggers
//!
//! ## Consistency
//!
//! The triggers run inside the statement that mutates `memories`, so a row
//! and its index entry are written or removed together. No reader can see a
//! row without its index entry or the reverse.

use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::paths::{DbLocation, StoragePaths};

const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// Memory store handle
///
/// One handle per process, created at startup and passed by reference to
/// every operation. Dropping it closes the connection; `close()` does the
/// same but reports failures.
pub struct MemoryDb {
    conn: Connection,
    location: DbLocation,
}

impl MemoryDb {
    /// Open the store described by `paths`
    ///
    /// # Behavior
    /// * Creates the data directory and the store file's parent if missing
    /// * Enables write-ahead logging (in-memory stores keep `memory` mode)
    /// * Creates table, index and triggers if they do not exist
    pub fn open(paths: &StoragePaths) -> Result<Self> {
        ensure_dir(&paths.data_dir)?;

        let conn = match &paths.db {
            DbLocation::File(path) => {
                if let Some(parent) = path.parent() {
                    ensure_dir(parent)?;
                }
                info!(path = %path.display(), "Opening memory store");
                Connection::open(path)?
            }
            DbLocation::InMemory => {
                info!("Opening volatile in-memory store");
                Connection::open_in_memory()?
            }
        };

        Self::from_connection(conn, paths.db.clone())
    }

    /// Open a volatile store that lives only as long as the handle
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?, DbLocation::InMemory)
    }

    fn from_connection(conn: Connection, location: DbLocation) -> Result<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;

        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        debug!(journal_mode = %mode, "Journal mode set");

        init_schema(&conn)?;

        Ok(MemoryDb { conn, location })
    }

    /// SQLite connection
    ///
    /// Exposed for direct queries in tests
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Where this store lives
    pub fn location(&self) -> &DbLocation {
        &self.location
    }

    /// Size of the persisted store in bytes (main file plus write-ahead log),
    /// `None` for a volatile store
    pub fn size_on_disk(&self) -> Option<u64> {
        let path = self.location.file()?;
        let main = fs::metadata(path).map(|m| m.len()).ok()?;

        let mut wal_name = path.as_os_str().to_owned();
        wal_name.push("-wal");
        let wal = fs::metadata(PathBuf::from(wal_name))
            .map(|m| m.len())
            .unwrap_or(0);

        Some(main + wal)
    }

    /// Release the connection
    pub fn close(self) -> Result<()> {
        info!(location = %self.location, "Closing memory store");
        self.conn.close().map_err(|(_, e)| Error::Storage(e))
    }

    /// Drop and recreate table, index and triggers
    ///
    /// Test isolation only; every stored memory is lost.
    #[cfg(any(test, feature = "test-support"))]
    pub fn reset(&self) -> Result<()> {
        info!(location = %self.location, "Resetting memory store");
        self.conn.execute_batch(
            "DROP TRIGGER IF EXISTS memories_ai;
             DROP TRIGGER IF EXISTS memories_ad;
             DROP TRIGGER IF EXISTS memories_au;
             DROP TABLE IF EXISTS memories_fts;
             DROP TABLE IF EXISTS memories;",
        )?;
        init_schema(&self.conn)
    }
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() || dir.exists() {
        return Ok(());
    }
    debug!(dir = %dir.display(), "Creating storage directory");
    fs::create_dir_all(dir).map_err(|source| Error::Io {
        path: dir.to_path_buf(),
        source,
    })
}

/// Create table, FTS5 index and sync triggers (idempotent)
fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS memories (
            id TEXT PRIMARY KEY NOT NULL,
            content TEXT NOT NULL,
            area TEXT NOT NULL DEFAULT 'general',
            project TEXT,
            tags TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_memories_created ON memories(created_at);
        CREATE INDEX IF NOT EXISTS idx_memories_area ON memories(area);
        CREATE INDEX IF NOT EXISTS idx_memories_project ON memories(project);

        CREATE VIRTUAL TABLE IF NOT EXISTS memories_fts USING fts5(
            content,
            project,
            tags,
            content='memories',
            content_rowid='rowid'
        );",
    )?;

    init_triggers(conn)
}

/// Index sync triggers
///
/// An external-content FTS5 table must be told the exact old values to
/// remove an entry, so insert and delete both use `COALESCE(project, '')`.
fn init_triggers(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TRIGGER IF NOT EXISTS memories_ai AFTER INSERT ON memories BEGIN
            INSERT INTO memories_fts(rowid, content, project, tags)
            VALUES (new.rowid, new.content, COALESCE(new.project, ''), new.tags);
        END;

        CREATE TRIGGER IF NOT EXISTS memories_ad AFTER DELETE ON memories BEGIN
            INSERT INTO memories_fts(memories_fts, rowid, content, project, tags)
            VALUES ('delete', old.rowid, old.content, COALESCE(old.project, ''), old.tags);
        END;

        CREATE TRIGGER IF NOT EXISTS memories_au AFTER UPDATE ON memories BEGIN
            INSERT INTO memories_fts(memories_fts, rowid, content, project, tags)
            VALUES ('delete', old.rowid, old.content, COALESCE(old.project, ''), old.tags);
            INSERT INTO memories_fts(rowid, content, project, tags)
            VALUES (new.rowid, new.content, COALESCE(new.project, ''), new.tags);
        END;",
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn object_exists(db: &MemoryDb, kind: &str, name: &str) -> bool {
        let count: i64 = db
            .conn()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = ?1 AND name = ?2",
                [kind, name],
                |row| row.get(0),
            )
            .unwrap();
        count == 1
    }

    #[test]
    fn test_schema_created_in_memory() {
        let db = MemoryDb::open_in_memory().unwrap();
        assert!(object_exists(&db, "table", "memories"));
        assert!(object_exists(&db, "table", "memories_fts"));
        assert!(object_exists(&db, "trigger", "memories_ai"));
        assert!(object_exists(&db, "trigger", "memories_ad"));
        assert!(object_exists(&db, "trigger", "memories_au"));
        assert!(db.location().is_in_memory());
        assert_eq!(db.size_on_disk(), None);
    }

    #[test]
    fn test_open_creates_directories_and_file() {
        let temp = TempDir::new().unwrap();
        let data_dir = temp.path().join("data");
        let db_path = temp.path().join("nested").join("store").join("memories.db");
        let paths = StoragePaths {
            data_dir: data_dir.clone(),
            db: DbLocation::File(db_path.clone()),
        };

        let db = MemoryDb::open(&paths).unwrap();
        assert!(data_dir.is_dir());
        assert!(db_path.is_file());
        assert!(db.size_on_disk().unwrap() > 0);

        let mode: String = db
            .conn()
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
        db.close().unwrap();
    }

    #[test]
    fn test_reopen_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let paths = StoragePaths {
            data_dir: temp.path().to_path_buf(),
            db: DbLocation::File(temp.path().join("omni-memory.db")),
        };

        let db = MemoryDb::open(&paths).unwrap();
        db.conn()
            .execute(
                "INSERT INTO memories (id, content, area, project, tags, created_at, updated_at)
                 VALUES ('a', 'kept across reopen', 'general', NULL, '[]', 'x', 'x')",
                [],
            )
            .unwrap();
        db.close().unwrap();

        let db = MemoryDb::open(&paths).unwrap();
        let count: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM memories", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_open_fails_when_directory_cannot_be_created() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, b"not a directory").unwrap();
        let paths = StoragePaths {
            data_dir: blocker.join("data"),
            db: DbLocation::InMemory,
        };

        let err = MemoryDb::open(&paths).err().unwrap();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_reset_recreates_empty_schema() {
        let db = MemoryDb::open_in_memory().unwrap();
        db.conn()
            .execute(
                "INSERT INTO memories (id, content, area, project, tags, created_at, updated_at)
                 VALUES ('a', 'gone after reset', 'general', NULL, '[]', 'x', 'x')",
                [],
            )
            .unwrap();

        db.reset().unwrap();

        let count: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM memories", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
        assert!(object_exists(&db, "trigger", "memories_au"));
    }
}
