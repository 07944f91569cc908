//! CLI module
//!
//! Provides:
//! - Argument parsing (`serve` plus one-shot store commands)
//! - Settings resolution (flags → environment → defaults)
//! - Command dispatch and exit codes

pub mod args;
pub mod dispatch;

use anyhow::{Context, Result};
use omni_memory_store::paths::normalize_user_path;
use omni_memory_store::{resolve_storage_paths, MemoryDb, StoreSettings};
use std::io;
use std::path::PathBuf;
use tracing::info;

pub use args::{Args, Command, Scope};
pub use dispatch::{render_paths, run_command};

use crate::logging::init_logging;
use crate::server::MemoryServer;

/// Exit codes (deterministic)
pub const EXIT_SUCCESS: i32 = 0;
/// A tool reported an error (not found, validation, search syntax)
pub const EXIT_FAILURE: i32 = 1;
/// Settings, storage or I/O failure before or outside a tool call
pub const EXIT_STORE_ERROR: i32 = 2;

/// Settings with CLI flags applied over the environment
pub fn load_settings(args: &Args) -> Result<StoreSettings> {
    let settings = StoreSettings::from_env().context("Failed to read OMNI_MEMORY_* settings")?;
    Ok(settings.with_overrides(args.dir.clone(), args.db.clone()))
}

/// Run the CLI and return the process exit code
pub fn run(args: Args) -> Result<i32> {
    let settings = load_settings(&args)?;

    let log_dir: Option<PathBuf> = settings
        .log_dir
        .as_deref()
        .map(normalize_user_path)
        .transpose()?;
    let _guard = init_logging(args.log_json, log_dir.as_deref())?;

    let paths = resolve_storage_paths(&settings)?;

    let command = args.command();
    if command == Command::Paths {
        println!("{}", render_paths(&paths));
        return Ok(EXIT_SUCCESS);
    }

    let db = MemoryDb::open(&paths)
        .with_context(|| format!("Failed to open memory store at {}", paths.db))?;

    if command == Command::Serve {
        info!(version = env!("CARGO_PKG_VERSION"), "Starting omni-memory server");
        MemoryServer::new(db).run(io::stdin().lock(), io::stdout().lock())?;
        return Ok(EXIT_SUCCESS);
    }

    let response = run_command(&db, command);
    db.close()?;

    if response.is_error {
        eprintln!("{}", response.text);
        Ok(EXIT_FAILURE)
    } else {
        println!("{}", response.text);
        Ok(EXIT_SUCCESS)
    }
}
