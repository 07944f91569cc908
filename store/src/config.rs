//! Store settings
//!
//! Read once per process from `OMNI_MEMORY_*` environment variables:
//! - `OMNI_MEMORY_DIR`: storage directory
//! - `OMNI_MEMORY_DB`: storage file, or `:memory:` for a volatile store
//! - `OMNI_MEMORY_LOG_DIR`: optional log directory (used by the binary)

use config::{Config, Environment};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::Result;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "OMNI_MEMORY";

/// Raw storage settings, before path resolution
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Storage directory override
    pub dir: Option<String>,
    /// Storage file override
    pub db: Option<String>,
    /// Log directory for the rolling file appender
    pub log_dir: Option<String>,
}

impl StoreSettings {
    /// Load settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    /// Load settings from an explicit variable map instead of the process
    /// environment. Keys use the full variable names (`OMNI_MEMORY_DIR`, ...).
    pub fn from_map(vars: HashMap<String, String>) -> Result<Self> {
        Self::load(Some(vars.into_iter().collect()))
    }

    fn load(source: Option<config::Map<String, String>>) -> Result<Self> {
        let settings = Config::builder()
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .ignore_empty(true)
                    .source(source),
            )
            .build()?;

        let mut loaded: StoreSettings = settings.try_deserialize()?;
        loaded.dir = non_blank(loaded.dir);
        loaded.db = non_blank(loaded.db);
        loaded.log_dir = non_blank(loaded.log_dir);
        Ok(loaded)
    }

    /// Overlay explicit overrides (CLI flags) on top of these settings
    pub fn with_overrides(mut self, dir: Option<String>, db: Option<String>) -> Self {
        if let Some(dir) = non_blank(dir) {
            self.dir = Some(dir);
        }
        if let Some(db) = non_blank(db) {
            self.db = Some(db);
        }
        self
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
