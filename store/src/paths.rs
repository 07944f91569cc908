//! Storage path resolution
//!
//! Pure helpers that turn user-supplied locations into absolute, normalized
//! paths. Resolution order for the store file:
//! 1. `OMNI_MEMORY_DB` (or `--db`); `:memory:` selects a volatile store
//! 2. `<data dir>/omni-memory.db`
//!
//! and for the data directory:
//! 1. `OMNI_MEMORY_DIR` (or `--dir`)
//! 2. `~/.omni-memory`
//!
//! Resolved once at startup; the location does not change for the lifetime
//! of the process.

use serde::Serialize;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::config::StoreSettings;
use crate::error::{Error, Result};

/// Default directory name under the home directory
pub const DEFAULT_DIR_NAME: &str = ".omni-memory";
/// Default store file name inside the data directory
pub const DEFAULT_DB_FILE: &str = "omni-memory.db";
/// Store file value selecting a volatile, in-memory store
pub const IN_MEMORY: &str = ":memory:";

/// Where the store lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DbLocation {
    File(PathBuf),
    InMemory,
}

impl DbLocation {
    pub fn is_in_memory(&self) -> bool {
        matches!(self, DbLocation::InMemory)
    }

    pub fn file(&self) -> Option<&Path> {
        match self {
            DbLocation::File(path) => Some(path),
            DbLocation::InMemory => None,
        }
    }
}

impl fmt::Display for DbLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbLocation::File(path) => write!(f, "{}", path.display()),
            DbLocation::InMemory => f.write_str(IN_MEMORY),
        }
    }
}

/// Resolved storage directory and store location
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoragePaths {
    pub data_dir: PathBuf,
    pub db: DbLocation,
}

/// Home directory from the platform
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or(Error::HomeDirUnavailable)
}

/// Expand a leading `~`, `~/` or `~\` against `home`
///
/// Anything else (including `~user`) is returned unchanged.
pub fn expand_home_with(input: &str, home: &Path) -> PathBuf {
    if input == "~" {
        return home.to_path_buf();
    }
    if let Some(rest) = input.strip_prefix("~/").or_else(|| input.strip_prefix("~\\")) {
        return home.join(rest);
    }
    PathBuf::from(input)
}

/// Expand a leading home shorthand using the platform home directory
pub fn expand_home(input: &str) -> Result<PathBuf> {
    if input == "~" || input.starts_with("~/") || input.starts_with("~\\") {
        Ok(expand_home_with(input, &home_dir()?))
    } else {
        Ok(PathBuf::from(input))
    }
}

/// Lexically normalize a path: drop `.` components and fold `..` into the
/// preceding component. The filesystem is not consulted.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `..` above the root stays at the root
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Turn user input into an absolute, normalized path given explicit home and
/// working directories
pub fn normalize_user_path_with(input: &str, home: &Path, cwd: &Path) -> PathBuf {
    let expanded = expand_home_with(input.trim(), home);
    if expanded.is_absolute() {
        normalize_lexically(&expanded)
    } else {
        normalize_lexically(&cwd.join(expanded))
    }
}

/// Turn user input into an absolute, normalized path using the platform home
/// directory and the process working directory
pub fn normalize_user_path(input: &str) -> Result<PathBuf> {
    let trimmed = input.trim();
    let expanded = expand_home(trimmed)?;
    if expanded.is_absolute() {
        return Ok(normalize_lexically(&expanded));
    }

    let cwd = std::env::current_dir().map_err(|source| Error::Io {
        path: PathBuf::from("."),
        source,
    })?;
    Ok(normalize_lexically(&cwd.join(expanded)))
}

/// Resolve the storage directory and store file from settings
pub fn resolve_storage_paths(settings: &StoreSettings) -> Result<StoragePaths> {
    let data_dir = match settings.dir.as_deref() {
        Some(dir) => normalize_user_path(dir)?,
        None => home_dir()?.join(DEFAULT_DIR_NAME),
    };

    let db = match settings.db.as_deref() {
        Some(db) if db.trim() == IN_MEMORY => DbLocation::InMemory,
        Some(db) => DbLocation::File(normalize_user_path(db)?),
        None => DbLocation::File(data_dir.join(DEFAULT_DB_FILE)),
    };

    Ok(StoragePaths { data_dir, db })
}
